//! Weekly schedule: one flattened step sequence per day.

use crate::types::{DayConfig, DAYS};
use crate::{Error, ExerciseCatalog, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Starter plan: exercise ids per day, each expanded by its suggested sets
const DEFAULT_PLAN: [(&str, &[&str]); 7] = [
    (
        "Monday",
        &[
            "weighted-pullups",
            "cossack-squats",
            "dips",
            "ring-hamstring-curls",
            "hollow-body-hold",
        ],
    ),
    (
        "Tuesday",
        &["incline-walking", "hs-prep", "wall-line-holds", "pancake"],
    ),
    (
        "Wednesday",
        &["rows", "cossack-squats", "pushups", "back-extension"],
    ),
    (
        "Thursday",
        &["incline-walking", "hs-prep", "wall-line-holds", "pancake"],
    ),
    (
        "Friday",
        &[
            "weighted-pullups",
            "cossack-squats",
            "dips",
            "ring-hamstring-curls",
            "hollow-body-hold",
        ],
    ),
    ("Saturday", &[]),
    ("Sunday", &[]),
];

/// Day id -> step sequence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct WeeklySchedule {
    days: BTreeMap<String, DayConfig>,
}

impl WeeklySchedule {
    pub fn from_days(days: BTreeMap<String, DayConfig>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &BTreeMap<String, DayConfig> {
        &self.days
    }

    /// Steps planned for a day; unknown or unset days are empty
    pub fn steps_for(&self, day_id: &str) -> &[String] {
        self.days
            .get(day_id)
            .map(|d| d.steps.as_slice())
            .unwrap_or(&[])
    }

    pub fn day(&self, day_id: &str) -> Option<&DayConfig> {
        self.days.get(day_id)
    }

    /// Replace a day's configuration wholesale
    pub fn set_day(&mut self, day_id: &str, config: DayConfig) -> Result<()> {
        if !DAYS.contains(&day_id) {
            return Err(Error::Schedule(format!("unknown day: {}", day_id)));
        }
        tracing::debug!("Saving {} with {} steps", day_id, config.steps.len());
        self.days.insert(day_id.to_string(), config);
        Ok(())
    }

    /// Days in week order with their configurations (unset days as empty)
    pub fn iter_week(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        DAYS.iter().map(move |day| (*day, self.steps_for(day)))
    }
}

/// Expand the starter plan into flattened steps using each exercise's
/// suggested set count. Ids missing from the catalog are dropped.
pub fn build_default_schedule(catalog: &ExerciseCatalog) -> WeeklySchedule {
    let mut days = BTreeMap::new();

    for (day, ids) in DEFAULT_PLAN {
        let mut config = DayConfig::default();
        for id in ids {
            if let Some(exercise) = catalog.get(id) {
                config.push_sets(id, exercise.sets);
            }
        }
        days.insert(day.to_string(), config);
    }

    WeeklySchedule { days }
}

impl DayConfig {
    pub fn push_step(&mut self, exercise_id: &str) {
        self.steps.push(exercise_id.to_string());
    }

    /// Append `count` consecutive sets of one exercise
    pub fn push_sets(&mut self, exercise_id: &str, count: u32) {
        for _ in 0..count {
            self.push_step(exercise_id);
        }
    }

    /// Insert before `index`; indices past the end append
    pub fn insert_step(&mut self, index: usize, exercise_id: &str) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, exercise_id.to_string());
    }

    pub fn remove_step(&mut self, index: usize) -> Result<String> {
        if index >= self.steps.len() {
            return Err(Error::Schedule(format!(
                "step {} out of range ({} steps)",
                index,
                self.steps.len()
            )));
        }
        Ok(self.steps.remove(index))
    }

    /// Move the step at `from` so that it ends up at position `to`
    pub fn move_step(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.steps.len() {
            return Err(Error::Schedule(format!(
                "step {} out of range ({} steps)",
                from,
                self.steps.len()
            )));
        }
        let step = self.steps.remove(from);
        let to = to.min(self.steps.len());
        self.steps.insert(to, step);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
