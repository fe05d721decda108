#![forbid(unsafe_code)]

//! Core domain model and business logic for FlexiLog, a weekly workout
//! planner and logger.
//!
//! This crate provides:
//! - Domain types (exercises, day plans, set and workout logs, sessions)
//! - Exercise library and weekly schedule management
//! - Step resolution and the workout session engine
//! - Persistence (state slices, history log) and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod schedule;
pub mod resolver;
pub mod engine;
pub mod history;
pub mod stopwatch;
pub mod config;
pub mod logging;
pub mod wal;
pub mod state;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseCatalog, ExerciseDraft, ExercisePatch};
pub use schedule::{build_default_schedule, WeeklySchedule};
pub use engine::{LogOutcome, RestTick, SessionEngine, SetInput, StepView};
pub use history::{finalize, load_history};
pub use stopwatch::Stopwatch;
pub use config::Config;
pub use wal::{HistorySink, JsonlSink};
pub use state::{AppState, Store};
