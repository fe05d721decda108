//! Core domain types for FlexiLog.
//!
//! This module defines the data contracts shared by every other module:
//! - Exercises and how their sets are logged
//! - Day configurations (the flattened step sequence)
//! - Set and workout logs
//! - The live session state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Day identifiers in week order.
pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Parse a day name case-insensitively into its canonical spelling
pub fn parse_day(s: &str) -> Option<&'static str> {
    let wanted = s.trim();
    DAYS.iter()
        .copied()
        .find(|day| day.eq_ignore_ascii_case(wanted))
}

// ============================================================================
// Exercise Types
// ============================================================================

/// How a set of an exercise is measured
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoggingType {
    Reps,
    Time,
}

impl LoggingType {
    /// Short unit shown next to targets and inputs
    pub fn unit(self) -> &'static str {
        match self {
            LoggingType::Reps => "reps",
            LoggingType::Time => "sec",
        }
    }

    /// Label used in the exported history
    pub fn export_label(self) -> &'static str {
        match self {
            LoggingType::Time => "Seconds",
            LoggingType::Reps => "Reps",
        }
    }
}

/// A catalog entry (e.g., "Weighted Pull-ups")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Suggested set count, only used when expanding a plan
    pub sets: u32,
    /// Free-form target such as "6-8" or "30-45"
    pub reps_or_time: String,
    /// Rest after each set in seconds; 0 means no rest period
    pub rest: u32,
    pub logging_type: LoggingType,
    #[serde(default)]
    pub cues: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    pub category: String,
}

// ============================================================================
// Schedule Types
// ============================================================================

/// One schedule slot. Each entry of `steps` is exactly one set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DayConfig {
    pub steps: Vec<String>,
}

// ============================================================================
// Log Types
// ============================================================================

/// One completed set, frozen at the moment it was logged
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetLog {
    pub exercise_id: String,
    /// Name at logging time; later renames do not rewrite history
    pub exercise_name: String,
    pub set_number: u32,
    pub value: u32,
    #[serde(rename = "type")]
    pub logging_type: LoggingType,
    pub timestamp: DateTime<Utc>,
}

/// A finished workout as stored in history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub day_id: String,
    pub date: DateTime<Utc>,
    pub sets: Vec<SetLog>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Which half of the work/rest cycle an active session is in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Working,
    Resting,
}

/// The live, in-progress workout
///
/// Invariants:
/// - `step_index <= steps.len()`; the session is complete exactly at equality
/// - `rest_time_left > 0` implies `is_resting`
/// - `completed_sets` only grows, in step order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub is_active: bool,
    pub day_id: String,
    pub step_index: usize,
    pub is_resting: bool,
    pub rest_time_left: u32,
    pub completed_sets: Vec<SetLog>,
}

impl SessionState {
    /// Fresh state for a day, positioned on the first step
    pub fn new(day_id: impl Into<String>) -> Self {
        Self {
            is_active: true,
            day_id: day_id.into(),
            step_index: 0,
            is_resting: false,
            rest_time_left: 0,
            completed_sets: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_resting {
            SessionPhase::Resting
        } else {
            SessionPhase::Working
        }
    }

    /// True once the cursor has walked off the end of the step sequence
    pub fn is_complete(&self, step_count: usize) -> bool {
        self.step_index >= step_count
    }
}
