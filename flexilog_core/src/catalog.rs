//! Exercise library and category management.
//!
//! The catalog is the single owner of every exercise definition. Editors
//! anywhere in the application go through [`ExerciseCatalog::update_exercise`]
//! rather than mutating a local copy.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog_internal);

/// Categories a fresh install starts with
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Strength",
    "Lower Body",
    "Core",
    "Cardio",
    "Handstand",
    "Mobility",
];

/// The exercise library plus the set of categories exercises may use
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    categories: Vec<String>,
}

/// Fields for a new exercise; the catalog assigns the id
#[derive(Clone, Debug)]
pub struct ExerciseDraft {
    pub name: String,
    pub sets: u32,
    pub reps_or_time: String,
    pub rest: u32,
    pub logging_type: LoggingType,
    pub cues: Vec<String>,
    pub hints: Vec<String>,
    pub category: String,
}

impl ExerciseDraft {
    /// A draft with the library form's defaults
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: 3,
            reps_or_time: "8-12".into(),
            rest: 90,
            logging_type: LoggingType::Reps,
            cues: Vec::new(),
            hints: Vec::new(),
            category: category.into(),
        }
    }
}

/// Partial update for an existing exercise. `None` leaves a field alone.
#[derive(Clone, Debug, Default)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub sets: Option<u32>,
    pub reps_or_time: Option<String>,
    pub rest: Option<u32>,
    pub logging_type: Option<LoggingType>,
    pub cues: Option<Vec<String>>,
    pub hints: Option<Vec<String>>,
    pub category: Option<String>,
}

impl ExerciseCatalog {
    pub fn new(exercises: Vec<Exercise>, categories: Vec<String>) -> Self {
        Self {
            exercises,
            categories,
        }
    }

    /// Look up an exercise by id
    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Add a new exercise and return its generated id
    pub fn add_exercise(&mut self, draft: ExerciseDraft) -> Result<String> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::Catalog("exercise name cannot be empty".into()));
        }
        self.require_category(&draft.category)?;

        let id = self.unique_id_for(name);
        self.exercises.push(Exercise {
            id: id.clone(),
            name: name.to_string(),
            sets: draft.sets,
            reps_or_time: draft.reps_or_time,
            rest: draft.rest,
            logging_type: draft.logging_type,
            cues: draft.cues,
            hints: draft.hints,
            category: draft.category,
        });

        tracing::info!("Added exercise {} ({})", name, id);
        Ok(id)
    }

    /// Apply a patch to the catalog entry with the given id
    pub fn update_exercise(&mut self, id: &str, patch: ExercisePatch) -> Result<&Exercise> {
        if let Some(ref category) = patch.category {
            self.require_category(category)?;
        }
        if let Some(ref name) = patch.name {
            if name.trim().is_empty() {
                return Err(Error::Catalog("exercise name cannot be empty".into()));
            }
        }

        let exercise = self
            .exercises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::Catalog(format!("unknown exercise id: {}", id)))?;

        if let Some(name) = patch.name {
            exercise.name = name.trim().to_string();
        }
        if let Some(sets) = patch.sets {
            exercise.sets = sets;
        }
        if let Some(reps_or_time) = patch.reps_or_time {
            exercise.reps_or_time = reps_or_time;
        }
        if let Some(rest) = patch.rest {
            exercise.rest = rest;
        }
        if let Some(logging_type) = patch.logging_type {
            exercise.logging_type = logging_type;
        }
        if let Some(cues) = patch.cues {
            exercise.cues = cues;
        }
        if let Some(hints) = patch.hints {
            exercise.hints = hints;
        }
        if let Some(category) = patch.category {
            exercise.category = category;
        }

        tracing::debug!("Updated exercise {}", id);
        Ok(exercise)
    }

    /// Remove an exercise from the library.
    ///
    /// Schedules that reference it are left alone; their steps become stale.
    pub fn remove_exercise(&mut self, id: &str) -> Option<Exercise> {
        let pos = self.exercises.iter().position(|e| e.id == id)?;
        let removed = self.exercises.remove(pos);
        tracing::info!("Removed exercise {}", id);
        Some(removed)
    }

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Catalog("category name cannot be empty".into()));
        }
        if self.has_category(name) {
            return Err(Error::Catalog(format!("category already exists: {}", name)));
        }
        self.categories.push(name.to_string());
        Ok(())
    }

    /// Remove a category. Exercises keep the orphaned value.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != name);
        self.categories.len() != before
    }

    /// Validate catalog consistency
    ///
    /// Returns a list of problems (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if !seen.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise id: {}", exercise.id));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise {} has an empty name", exercise.id));
            }
            if !self.has_category(&exercise.category) {
                errors.push(format!(
                    "Exercise {} uses unknown category '{}'",
                    exercise.id, exercise.category
                ));
            }
        }

        errors
    }

    fn require_category(&self, category: &str) -> Result<()> {
        if self.has_category(category) {
            Ok(())
        } else {
            Err(Error::Catalog(format!("unknown category: {}", category)))
        }
    }

    fn unique_id_for(&self, name: &str) -> String {
        let base = slugify(name);
        let base = if base.is_empty() {
            "exercise".to_string()
        } else {
            base
        };

        if self.get(&base).is_none() {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or(base)
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the starter exercises and categories
pub fn build_default_catalog() -> ExerciseCatalog {
    build_default_catalog_internal()
}

#[allow(clippy::too_many_arguments)]
fn exercise(
    id: &str,
    name: &str,
    sets: u32,
    reps_or_time: &str,
    rest: u32,
    logging_type: LoggingType,
    cues: &[&str],
    hints: &[&str],
    category: &str,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        sets,
        reps_or_time: reps_or_time.into(),
        rest,
        logging_type,
        cues: cues.iter().map(|s| s.to_string()).collect(),
        hints: hints.iter().map(|s| s.to_string()).collect(),
        category: category.into(),
    }
}

fn build_default_catalog_internal() -> ExerciseCatalog {
    use LoggingType::{Reps, Time};

    let exercises = vec![
        // ====================================================================
        // Strength day A
        // ====================================================================
        exercise(
            "weighted-pullups",
            "Weighted Pull-ups",
            5,
            "4-6",
            150,
            Reps,
            &[
                "Dead hang every rep",
                "Initiate by pulling shoulders down first",
                "Smooth, even tempo",
            ],
            &[
                "Stop when speed slows",
                "Leave ~2 reps in reserve",
                "Never grind the last rep",
            ],
            "Strength",
        ),
        exercise(
            "cossack-squats",
            "Cossack Squats",
            3,
            "6-8",
            75,
            Reps,
            &[
                "Sit into the hip",
                "Heel flat on the working leg",
                "Long spine",
            ],
            &[
                "Use hands for balance",
                "Depth only as far as control allows",
            ],
            "Lower Body",
        ),
        exercise(
            "dips",
            "Dips",
            4,
            "6-8",
            105,
            Reps,
            &[
                "Shoulders down and stable",
                "Elbows track naturally",
                "Full lockout without shrugging",
            ],
            &[
                "Slight forward lean is fine",
                "If shoulders complain, shorten ROM slightly",
            ],
            "Strength",
        ),
        exercise(
            "ring-hamstring-curls",
            "Ring Hamstring Curls",
            3,
            "6-8",
            90,
            Reps,
            &[
                "Hips slightly off floor",
                "Slow eccentric (≈3 s)",
                "Core lightly braced",
            ],
            &[
                "Reduce to 2 sets if hamstrings fatigue early",
                "Never rush reps",
            ],
            "Lower Body",
        ),
        exercise(
            "hollow-body-hold",
            "Hollow Body Hold",
            3,
            "20-30",
            50,
            Time,
            &[
                "Lower back pressed into floor",
                "Ribs down",
                "Legs only as low as you can control",
            ],
            &[],
            "Core",
        ),
        // ====================================================================
        // Cardio / handstand day
        // ====================================================================
        exercise(
            "incline-walking",
            "Incline Walking (Zone 2)",
            1,
            "1800-2700",
            0,
            Time,
            &[
                "Nasal breathing only",
                "Conversational pace",
                "Incline ≤10%",
            ],
            &["If quads burn, slow down"],
            "Cardio",
        ),
        exercise(
            "hs-prep",
            "Wrist & Shoulder Prep",
            1,
            "300",
            0,
            Time,
            &["Wrist circles, pulses", "Scapular shrugs in plank"],
            &[],
            "Handstand",
        ),
        exercise(
            "wall-line-holds",
            "Wall Line Holds",
            5,
            "30-45",
            50,
            Time,
            &[
                "Push tall through shoulders",
                "Ribs tucked, glutes lightly squeezed",
            ],
            &["If line breaks → stop the set"],
            "Handstand",
        ),
        exercise(
            "pancake",
            "Seated Straddle Lean (Pancake)",
            3,
            "30-45",
            60,
            Time,
            &["Long spine", "Hinge at hips, not spine", "Active legs"],
            &[],
            "Mobility",
        ),
        // ====================================================================
        // Strength day B
        // ====================================================================
        exercise(
            "rows",
            "Rows (BW/Light)",
            4,
            "8-10",
            105,
            Reps,
            &[
                "Initiate with scapula",
                "3-second eccentric",
                "Chest to rings/bar",
            ],
            &["Should feel controlled"],
            "Strength",
        ),
        exercise(
            "pushups",
            "Push-ups",
            4,
            "8-12",
            75,
            Reps,
            &[
                "Straight body line",
                "Elbows ~30-45°",
                "Full lockout with protraction",
            ],
            &[],
            "Strength",
        ),
        exercise(
            "back-extension",
            "Back Extension / Superman",
            2,
            "10-12",
            60,
            Reps,
            &[],
            &[],
            "Strength",
        ),
    ];

    ExerciseCatalog {
        exercises,
        categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.categories().len(), 6);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = get_default_catalog().validate();
        assert!(errors.is_empty(), "Catalog errors: {:?}", errors);
    }

    #[test]
    fn test_add_exercise_generates_unique_slug() {
        let mut catalog = build_default_catalog();
        let first = catalog
            .add_exercise(ExerciseDraft::new("Goblet Squat", "Lower Body"))
            .unwrap();
        let second = catalog
            .add_exercise(ExerciseDraft::new("Goblet Squat", "Lower Body"))
            .unwrap();

        assert_eq!(first, "goblet-squat");
        assert_eq!(second, "goblet-squat-2");
        assert_eq!(catalog.get(&first).unwrap().rest, 90);
    }

    #[test]
    fn test_add_exercise_rejects_unknown_category() {
        let mut catalog = build_default_catalog();
        let result = catalog.add_exercise(ExerciseDraft::new("Sprint", "Speed"));
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_add_exercise_rejects_blank_name() {
        let mut catalog = build_default_catalog();
        let result = catalog.add_exercise(ExerciseDraft::new("   ", "Core"));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_exercise_applies_only_given_fields() {
        let mut catalog = build_default_catalog();
        let patch = ExercisePatch {
            rest: Some(30),
            name: Some("Pushups (Diamond)".into()),
            ..Default::default()
        };

        let updated = catalog.update_exercise("pushups", patch).unwrap();
        assert_eq!(updated.rest, 30);
        assert_eq!(updated.name, "Pushups (Diamond)");
        assert_eq!(updated.sets, 4);
        assert_eq!(updated.reps_or_time, "8-12");
    }

    #[test]
    fn test_update_unknown_exercise_fails() {
        let mut catalog = build_default_catalog();
        let result = catalog.update_exercise("nope", ExercisePatch::default());
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_update_checks_category_before_touching_entry() {
        let mut catalog = build_default_catalog();
        let patch = ExercisePatch {
            rest: Some(1),
            category: Some("Nonexistent".into()),
            ..Default::default()
        };
        assert!(catalog.update_exercise("dips", patch).is_err());
        assert_eq!(catalog.get("dips").unwrap().rest, 105);
    }

    #[test]
    fn test_remove_exercise() {
        let mut catalog = build_default_catalog();
        let removed = catalog.remove_exercise("dips");
        assert_eq!(removed.map(|e| e.name), Some("Dips".to_string()));
        assert!(catalog.get("dips").is_none());
        assert!(catalog.remove_exercise("dips").is_none());
    }

    #[test]
    fn test_categories_add_and_remove() {
        let mut catalog = build_default_catalog();
        catalog.add_category("  Plyometrics ").unwrap();
        assert!(catalog.has_category("Plyometrics"));
        assert!(catalog.add_category("Plyometrics").is_err());
        assert!(catalog.add_category("").is_err());

        assert!(catalog.remove_category("Plyometrics"));
        assert!(!catalog.remove_category("Plyometrics"));
    }

    #[test]
    fn test_removing_category_orphans_exercises() {
        let mut catalog = build_default_catalog();
        catalog.remove_category("Core");

        let hollow = catalog.get("hollow-body-hold").unwrap();
        assert_eq!(hollow.category, "Core");

        let errors = catalog.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("hollow-body-hold"));
    }
}
