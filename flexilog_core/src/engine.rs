//! Workout session engine.
//!
//! Drives a single [`SessionState`] through a day's step sequence:
//! - `start` positions a fresh session on the first resolvable step
//! - `log_set` records the current step and either rests, advances or finishes
//! - `tick_rest` / `skip_rest` run the rest countdown
//! - `cancel` abandons the session without a trace
//!
//! Steps whose exercise id no longer resolves in the catalog are skipped
//! without producing a [`SetLog`].

use crate::resolver::{
    exercise_at, next_resolvable, ordinal_set_number, set_progress, total_occurrences,
    SetProgress,
};
use crate::{Error, Exercise, ExerciseCatalog, LoggingType, Result, SessionState, SetLog};
use chrono::{DateTime, Utc};

/// What the user handed over when logging a set
#[derive(Clone, Debug)]
pub struct SetInput<'a> {
    /// Text as typed; may be blank or garbage
    pub raw: &'a str,
    /// Stopwatch reading at the moment of logging
    pub stopwatch_seconds: u32,
    pub logged_at: DateTime<Utc>,
}

impl<'a> SetInput<'a> {
    pub fn new(raw: &'a str, stopwatch_seconds: u32) -> Self {
        Self {
            raw,
            stopwatch_seconds,
            logged_at: Utc::now(),
        }
    }

    /// Override the timestamp recorded on the set
    pub fn at(mut self, logged_at: DateTime<Utc>) -> Self {
        self.logged_at = logged_at;
        self
    }
}

/// Result of a `log_set` call
#[derive(Clone, Debug)]
pub enum LogOutcome {
    /// The set was recorded and the session moved to the next step.
    /// `rest_seconds` is 0 when no rest period was entered.
    Advanced { set: SetLog, rest_seconds: u32 },
    /// The step sequence is exhausted. The engine no longer holds the
    /// session; hand the final state to [`crate::history::finalize`].
    Finished(SessionState),
}

/// Result of one rest-timer tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestTick {
    /// Not resting; nothing changed
    Idle,
    /// Still resting with this many seconds left
    Remaining(u32),
    /// This tick ended the rest period
    Elapsed,
}

/// Everything a front-end needs to render the current step
#[derive(Clone, Debug)]
pub struct StepView<'a> {
    pub exercise: &'a Exercise,
    pub step_index: usize,
    pub step_count: usize,
    pub set_number: u32,
    pub total_sets: u32,
    pub set_progress: Vec<(usize, SetProgress)>,
}

impl StepView<'_> {
    /// Share of steps already behind the cursor, 0.0..=100.0
    pub fn progress_percent(&self) -> f64 {
        if self.step_count == 0 {
            return 100.0;
        }
        self.step_index as f64 / self.step_count as f64 * 100.0
    }
}

/// Value to record for a set: the leading whole number of the input
/// ("8.5" and "12 reps" log 8 and 12), otherwise 0 for rep-based exercises
/// and the stopwatch reading for timed ones
pub fn resolve_value(logging_type: LoggingType, raw: &str, stopwatch_seconds: u32) -> u32 {
    match leading_integer(raw) {
        Some(value) => value,
        None => match logging_type {
            LoggingType::Reps => 0,
            LoggingType::Time => stopwatch_seconds,
        },
    }
}

fn leading_integer(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

impl SessionState {
    /// Advance the rest countdown by one second
    ///
    /// A no-op when the countdown is already at zero.
    pub fn tick_rest(&mut self) -> RestTick {
        if !self.is_resting || self.rest_time_left == 0 {
            return RestTick::Idle;
        }
        if self.rest_time_left == 1 {
            self.rest_time_left = 0;
            self.is_resting = false;
            return RestTick::Elapsed;
        }
        self.rest_time_left -= 1;
        RestTick::Remaining(self.rest_time_left)
    }

    /// End the rest period immediately; no-op when not resting
    pub fn skip_rest(&mut self) {
        if self.is_resting {
            tracing::debug!("Skipping rest with {}s left", self.rest_time_left);
            self.is_resting = false;
            self.rest_time_left = 0;
        }
    }
}

/// Owner of the single active session
#[derive(Debug, Default)]
pub struct SessionEngine {
    session: Option<SessionState>,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a session for `day_id`
    ///
    /// Fails if a session is already running, or if the day has no step
    /// that resolves in the catalog. Leading stale steps are skipped.
    pub fn start(
        &mut self,
        day_id: &str,
        steps: &[String],
        catalog: &ExerciseCatalog,
    ) -> Result<&SessionState> {
        if let Some(ref active) = self.session {
            return Err(Error::Session(format!(
                "a session for {} is already running",
                active.day_id
            )));
        }
        if steps.is_empty() {
            return Err(Error::Session(format!("{} has no planned sets", day_id)));
        }

        let first = next_resolvable(steps, catalog, 0);
        if first >= steps.len() {
            return Err(Error::Session(format!(
                "none of the exercises planned for {} exist in the library",
                day_id
            )));
        }
        if first > 0 {
            tracing::warn!("Skipping {} stale step(s) at the start of {}", first, day_id);
        }

        let mut state = SessionState::new(day_id);
        state.step_index = first;
        tracing::info!("Started session for {} ({} steps)", day_id, steps.len());

        Ok(&*self.session.insert(state))
    }

    /// Record the current step and move on
    pub fn log_set(
        &mut self,
        steps: &[String],
        catalog: &ExerciseCatalog,
        input: SetInput<'_>,
    ) -> Result<LogOutcome> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::Session("no active session".into()))?;

        if session.is_resting {
            tracing::debug!("Set logged during rest; dropping remaining rest");
            session.skip_rest();
        }

        let index = skip_stale(session, steps, catalog);
        if session.is_complete(steps.len()) {
            return self.finish(steps.len());
        }

        let exercise = exercise_at(steps, catalog, index)
            .ok_or_else(|| Error::Session(format!("step {} does not resolve", index)))?;

        let set = SetLog {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.clone(),
            set_number: ordinal_set_number(steps, index),
            value: resolve_value(exercise.logging_type, input.raw, input.stopwatch_seconds),
            logging_type: exercise.logging_type,
            timestamp: input.logged_at,
        };
        tracing::debug!(
            "Logged {} set {} = {} {}",
            set.exercise_name,
            set.set_number,
            set.value,
            set.logging_type.unit()
        );
        session.completed_sets.push(set.clone());

        session.step_index = index + 1;
        skip_stale(session, steps, catalog);
        if session.is_complete(steps.len()) {
            return self.finish(steps.len());
        }

        if exercise.rest > 0 {
            session.is_resting = true;
            session.rest_time_left = exercise.rest;
        } else {
            session.is_resting = false;
            session.rest_time_left = 0;
        }

        Ok(LogOutcome::Advanced {
            set,
            rest_seconds: exercise.rest,
        })
    }

    /// One second of rest has passed
    pub fn tick_rest(&mut self) -> RestTick {
        match self.session.as_mut() {
            Some(session) => session.tick_rest(),
            None => RestTick::Idle,
        }
    }

    pub fn skip_rest(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.skip_rest();
        }
    }

    /// Abandon the session; nothing is logged
    pub fn cancel(&mut self) -> Option<SessionState> {
        let cancelled = self.session.take();
        if let Some(ref session) = cancelled {
            tracing::info!(
                "Cancelled session for {} after {} set(s)",
                session.day_id,
                session.completed_sets.len()
            );
        }
        cancelled
    }

    /// The step the user should perform next, if any
    pub fn current_view<'a>(
        &self,
        steps: &[String],
        catalog: &'a ExerciseCatalog,
    ) -> Option<StepView<'a>> {
        let session = self.session.as_ref()?;
        let index = next_resolvable(steps, catalog, session.step_index);
        let exercise = exercise_at(steps, catalog, index)?;

        Some(StepView {
            exercise,
            step_index: index,
            step_count: steps.len(),
            set_number: ordinal_set_number(steps, index),
            total_sets: total_occurrences(steps, &exercise.id),
            set_progress: set_progress(steps, &exercise.id, index),
        })
    }

    fn finish(&mut self, step_count: usize) -> Result<LogOutcome> {
        let mut state = self
            .session
            .take()
            .ok_or_else(|| Error::Session("no active session".into()))?;
        state.step_index = step_count;
        state.is_resting = false;
        state.rest_time_left = 0;

        tracing::info!(
            "Finished session for {} with {} set(s)",
            state.day_id,
            state.completed_sets.len()
        );
        Ok(LogOutcome::Finished(state))
    }
}

/// Move the cursor past stale steps, returning the new cursor
fn skip_stale(session: &mut SessionState, steps: &[String], catalog: &ExerciseCatalog) -> usize {
    let next = next_resolvable(steps, catalog, session.step_index);
    if next > session.step_index {
        tracing::warn!(
            "Skipping {} step(s) with missing exercises in {}",
            next - session.step_index,
            session.day_id
        );
    }
    session.step_index = next.max(session.step_index);
    session.step_index
}
