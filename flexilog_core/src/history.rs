//! Log assembly and workout history.
//!
//! A finished [`SessionState`] is turned into a [`WorkoutLog`] exactly once
//! by [`finalize`], which consumes the state.

use crate::wal::{read_logs, HistorySink};
use crate::{Result, SessionState, WorkoutLog};
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

/// Build the history record for a finished session, stamped now
pub fn finalize(session: SessionState) -> WorkoutLog {
    finalize_at(session, Utc::now())
}

/// Build the history record for a finished session with an explicit date
pub fn finalize_at(session: SessionState, date: DateTime<Utc>) -> WorkoutLog {
    let log = WorkoutLog {
        id: Uuid::new_v4(),
        day_id: session.day_id,
        date,
        sets: session.completed_sets,
    };
    tracing::info!(
        "Assembled workout {} for {} ({} sets)",
        log.id,
        log.day_id,
        log.sets.len()
    );
    log
}

/// Finalize a session and durably append it to history
pub fn record(session: SessionState, sink: &mut dyn HistorySink) -> Result<WorkoutLog> {
    let log = finalize(session);
    sink.append(&log)?;
    Ok(log)
}

/// Load the full history, newest first
pub fn load_history(path: &Path) -> Result<Vec<WorkoutLog>> {
    let mut logs = read_logs(path)?;
    logs.reverse();
    tracing::info!("Loaded {} workouts from history", logs.len());
    Ok(logs)
}

/// Delete all history. Returns the number of workouts removed.
pub fn clear_history(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let count = read_logs(path)?.len();
    std::fs::remove_file(path)?;
    tracing::info!("Cleared {} workouts from history", count);
    Ok(count)
}
