//! CSV export of the workout history.
//!
//! One row per logged set, ordered by workout then by set within the workout.

use crate::{Error, Result, WorkoutLog};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A row in the exported CSV
#[derive(Debug, serde::Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Day")]
    day: &'a str,
    #[serde(rename = "Exercise")]
    exercise: &'a str,
    #[serde(rename = "Set Number")]
    set_number: u32,
    #[serde(rename = "Value")]
    value: u32,
    #[serde(rename = "Type")]
    kind: &'static str,
}

/// Reject strftime patterns chrono cannot render
pub fn check_date_format(date_format: &str) -> Result<()> {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!(
            "invalid date format: {:?}",
            date_format
        )));
    }
    Ok(())
}

fn format_date(date: &DateTime<Utc>, date_format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", date.with_timezone(&Local).format(date_format))
        .map_err(|_| Error::Other(format!("cannot format date with {:?}", date_format)))?;
    Ok(out)
}

/// Write `logs` as CSV to `writer`, every field quoted
///
/// `date_format` is a chrono strftime pattern applied to each workout's
/// completion date in local time. Returns the number of rows written; an
/// empty history writes nothing at all.
pub fn export_csv<W: Write>(logs: &[WorkoutLog], writer: W, date_format: &str) -> Result<usize> {
    check_date_format(date_format)?;
    if logs.is_empty() {
        tracing::info!("No workouts to export");
        return Ok(0);
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    let mut rows = 0;
    for log in logs {
        let date = format_date(&log.date, date_format)?;
        for set in &log.sets {
            csv_writer.serialize(ExportRow {
                date: date.clone(),
                day: &log.day_id,
                exercise: &set.exercise_name,
                set_number: set.set_number,
                value: set.value,
                kind: set.logging_type.export_label(),
            })?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    tracing::info!("Exported {} sets from {} workouts", rows, logs.len());
    Ok(rows)
}

/// Export to a file, syncing it to disk
pub fn export_to_path(logs: &[WorkoutLog], path: &Path, date_format: &str) -> Result<usize> {
    check_date_format(date_format)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    let rows = export_csv(logs, &mut file, date_format)?;
    file.sync_all()?;
    Ok(rows)
}

/// File name offered for an export made at `now`
pub fn default_export_filename(now: DateTime<Utc>) -> String {
    format!(
        "flexilog_workout_history_{}.csv",
        now.format("%Y-%m-%d")
    )
}
