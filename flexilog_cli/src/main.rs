use clap::{Args, Parser, Subcommand, ValueEnum};
use flexilog_core::resolver::{step_label, unique_exercises, SetProgress};
use flexilog_core::stopwatch::format_clock;
use flexilog_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "flexilog")]
#[command(about = "Weekly workout planner and set logger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's planned workout (default)
    Today,

    /// Run a guided workout for a day
    Start {
        /// Day to run (e.g. monday)
        day: String,

        /// Log every set with default values and skip rests (for scripting)
        #[arg(long)]
        auto_complete: bool,
    },

    /// View or edit the weekly plan
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Manage the exercise library
    #[command(subcommand)]
    Exercises(ExerciseCommand),

    /// Manage exercise categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// List finished workouts, newest first
    History {
        /// Delete all workout history
        #[arg(long)]
        clear: bool,
    },

    /// Export workout history as CSV
    Export {
        /// Output file (defaults to a dated file in the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Show the week, or every step of one day
    Show { day: Option<String> },

    /// Append sets of an exercise to a day
    Add {
        day: String,
        exercise_id: String,
        /// Number of sets (defaults to the exercise's suggested sets)
        #[arg(long)]
        sets: Option<u32>,
    },

    /// Remove one step (by index shown in `plan show`)
    Remove { day: String, index: usize },

    /// Move a step to a new position
    Move { day: String, from: usize, to: usize },

    /// Remove every step from a day
    Clear { day: String },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// List the exercise library
    List,

    /// Create a new exercise
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[command(flatten)]
        fields: ExerciseFields,
    },

    /// Edit an exercise everywhere it is used
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        fields: ExerciseFields,
    },

    /// Delete an exercise (planned steps that use it are skipped)
    Remove { id: String },
}

#[derive(Args)]
struct ExerciseFields {
    /// Suggested number of sets
    #[arg(long)]
    sets: Option<u32>,
    /// Target reps or seconds, e.g. "8-12"
    #[arg(long)]
    target: Option<String>,
    /// Rest after each set, in seconds
    #[arg(long)]
    rest: Option<u32>,
    /// How sets are logged
    #[arg(long, value_enum)]
    logging: Option<LoggingArg>,
    /// Coaching cue (repeatable)
    #[arg(long = "cue")]
    cues: Vec<String>,
    /// Secondary hint (repeatable)
    #[arg(long = "hint")]
    hints: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoggingArg {
    Reps,
    Time,
}

impl From<LoggingArg> for LoggingType {
    fn from(arg: LoggingArg) -> Self {
        match arg {
            LoggingArg::Reps => LoggingType::Reps,
            LoggingArg::Time => LoggingType::Time,
        }
    }
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// List categories
    List,
    /// Add a category
    Add { name: String },
    /// Remove a category (exercises keep the old value)
    Remove { name: String },
}

fn main() -> Result<()> {
    flexilog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Today) | None => cmd_today(&data_dir),
        Some(Commands::Start { day, auto_complete }) => {
            cmd_start(&data_dir, &day, auto_complete)
        }
        Some(Commands::Plan(cmd)) => cmd_plan(&data_dir, cmd),
        Some(Commands::Exercises(cmd)) => cmd_exercises(&data_dir, cmd),
        Some(Commands::Categories(cmd)) => cmd_categories(&data_dir, cmd),
        Some(Commands::History { clear }) => cmd_history(&data_dir, clear),
        Some(Commands::Export { output }) => cmd_export(&data_dir, output, &config),
    }
}

fn require_day(day: &str) -> Result<&'static str> {
    parse_day(day).ok_or_else(|| Error::Schedule(format!("unknown day: {}", day)))
}

fn load_state(data_dir: &Path) -> Result<AppState> {
    let state = AppState::load(&Store::new(data_dir))?;

    let problems = state.catalog.validate();
    if !problems.is_empty() {
        eprintln!("Exercise library warnings:");
        for problem in problems {
            eprintln!("  - {}", problem);
        }
    }

    Ok(state)
}

// ============================================================================
// Today / guided session
// ============================================================================

fn cmd_today(data_dir: &Path) -> Result<()> {
    let state = load_state(data_dir)?;
    let today = chrono::Local::now().format("%A").to_string();
    let steps = state.schedule.steps_for(&today);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  Today is {}", today);
    println!("╰─────────────────────────────────────────╯");
    println!();

    if steps.is_empty() {
        println!("  Rest day - nothing planned.");
        return Ok(());
    }

    for exercise in unique_exercises(steps, &state.catalog) {
        let sets = resolver::total_occurrences(steps, &exercise.id);
        println!(
            "  • {} - {} × {} {}",
            exercise.name,
            sets,
            exercise.reps_or_time,
            exercise.logging_type.unit()
        );
    }
    println!();
    println!(
        "  {} sets planned. Run `flexilog start {}` to begin.",
        steps.len(),
        today.to_lowercase()
    );
    println!();
    Ok(())
}

fn cmd_start(data_dir: &Path, day: &str, auto_complete: bool) -> Result<()> {
    let day = require_day(day)?;
    let state = load_state(data_dir)?;
    let steps = state.schedule.steps_for(day).to_vec();
    let catalog = &state.catalog;

    let mut engine = SessionEngine::new();
    engine.start(day, &steps, catalog)?;

    let input = if auto_complete {
        None
    } else {
        Some(spawn_stdin_reader())
    };
    let mut stopwatch = Stopwatch::new();

    println!("\n▶ {} workout - {} sets", day, steps.len());

    loop {
        let view = engine
            .current_view(&steps, catalog)
            .ok_or_else(|| Error::Session("no exercise to show for the current step".into()))?;
        display_step(&view);

        let raw = match input.as_ref() {
            None => String::new(),
            Some(rx) => {
                if view.exercise.logging_type == LoggingType::Time {
                    stopwatch.start();
                    println!("  ⏱ Stopwatch running - leave blank to log the elapsed time");
                }
                print!("  {} (blank = default, q = quit) > ", view.exercise.logging_type.unit());
                io::stdout().flush()?;

                let line = match rx.recv() {
                    Ok(line) => line,
                    Err(_) => {
                        engine.cancel();
                        println!("\nInput closed - workout cancelled, nothing logged.");
                        return Ok(());
                    }
                };
                stopwatch.stop();
                line
            }
        };

        if raw.trim().eq_ignore_ascii_case("q") {
            engine.cancel();
            println!("\nWorkout cancelled - nothing logged.");
            return Ok(());
        }

        let outcome = engine.log_set(
            &steps,
            catalog,
            SetInput::new(&raw, stopwatch.elapsed_seconds()),
        )?;
        stopwatch.reset();

        match outcome {
            LogOutcome::Advanced { set, rest_seconds } => {
                println!(
                    "  ✓ {} set {}: {} {}",
                    set.exercise_name,
                    set.set_number,
                    set.value,
                    set.logging_type.unit()
                );
                if rest_seconds > 0 {
                    run_rest(&mut engine, input.as_ref())?;
                }
            }
            LogOutcome::Finished(final_state) => {
                let mut sink = JsonlSink::new(Config::history_path(data_dir));
                let log = history::record(final_state, &mut sink)?;
                println!("\n✓ Workout logged! {} sets recorded.", log.sets.len());
                return Ok(());
            }
        }
    }
}

fn display_step(view: &StepView<'_>) {
    let exercise = view.exercise;
    println!();
    println!(
        "── Step {} / {} ({:.0}%) · {}",
        view.step_index + 1,
        view.step_count,
        view.progress_percent(),
        exercise.category
    );
    println!("  {}", exercise.name);
    println!(
        "  Target: {} {}   Set {} of {}",
        exercise.reps_or_time,
        exercise.logging_type.unit(),
        view.set_number,
        view.total_sets
    );

    let pills: String = view
        .set_progress
        .iter()
        .map(|(_, progress)| match progress {
            SetProgress::Completed => '●',
            SetProgress::Current => '◉',
            SetProgress::Upcoming => '○',
        })
        .collect();
    println!("  {}", pills);

    for cue in &exercise.cues {
        println!("  → {}", cue);
    }
    for hint in &exercise.hints {
        println!("  ℹ {}", hint);
    }
}

/// Count the rest period down once per second; any input line skips it
fn run_rest(engine: &mut SessionEngine, input: Option<&Receiver<String>>) -> Result<()> {
    let Some(rx) = input else {
        engine.skip_rest();
        return Ok(());
    };

    loop {
        let Some(left) = engine.session().map(|s| s.rest_time_left) else {
            return Ok(());
        };
        print!("\r  Rest {} (Enter to skip)   ", format_clock(left));
        io::stdout().flush()?;

        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(_) | Err(RecvTimeoutError::Disconnected) => {
                engine.skip_rest();
                break;
            }
            Err(RecvTimeoutError::Timeout) => match engine.tick_rest() {
                RestTick::Remaining(_) => continue,
                RestTick::Elapsed | RestTick::Idle => break,
            },
        }
    }
    println!("\r  Rest over.                         ");
    Ok(())
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        loop {
            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.trim_end().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

// ============================================================================
// Weekly plan
// ============================================================================

fn cmd_plan(data_dir: &Path, cmd: PlanCommand) -> Result<()> {
    let store = Store::new(data_dir);

    match cmd {
        PlanCommand::Show { day: None } => {
            let state = load_state(data_dir)?;
            for (day, steps) in state.schedule.iter_week() {
                let names: Vec<&str> = unique_exercises(steps, &state.catalog)
                    .iter()
                    .map(|e| e.name.as_str())
                    .collect();
                println!("{:<10} {:>3} sets  {}", day, steps.len(), names.join(", "));
            }
        }
        PlanCommand::Show { day: Some(day) } => {
            let day = require_day(&day)?;
            let state = load_state(data_dir)?;
            let steps = state.schedule.steps_for(day);
            println!("{} - {} sets planned", day, steps.len());
            for index in 0..steps.len() {
                println!("  {:>3}. {}", index, step_label(steps, &state.catalog, index));
            }
        }
        PlanCommand::Add {
            day,
            exercise_id,
            sets,
        } => {
            let day = require_day(&day)?;
            let count = AppState::update(&store, |state| {
                let count = match state.catalog.get(&exercise_id) {
                    Some(exercise) => sets.unwrap_or(exercise.sets),
                    None => {
                        return Err(Error::Schedule(format!(
                            "unknown exercise id: {}",
                            exercise_id
                        )))
                    }
                };
                let mut config = state.schedule.day(day).cloned().unwrap_or_default();
                config.push_sets(&exercise_id, count);
                state.schedule.set_day(day, config)?;
                Ok(count)
            })?;
            println!("✓ Added {} set(s) of {} to {}", count, exercise_id, day);
        }
        PlanCommand::Remove { day, index } => {
            let day = require_day(&day)?;
            let removed = AppState::update(&store, |state| {
                let mut config = state.schedule.day(day).cloned().unwrap_or_default();
                let removed = config.remove_step(index)?;
                state.schedule.set_day(day, config)?;
                Ok(removed)
            })?;
            println!("✓ Removed step {} ({}) from {}", index, removed, day);
        }
        PlanCommand::Move { day, from, to } => {
            let day = require_day(&day)?;
            AppState::update(&store, |state| {
                let mut config = state.schedule.day(day).cloned().unwrap_or_default();
                config.move_step(from, to)?;
                state.schedule.set_day(day, config)
            })?;
            println!("✓ Moved step {} to {} on {}", from, to, day);
        }
        PlanCommand::Clear { day } => {
            let day = require_day(&day)?;
            AppState::update(&store, |state| {
                state.schedule.set_day(day, DayConfig::default())
            })?;
            println!("✓ Cleared {}", day);
        }
    }

    Ok(())
}

// ============================================================================
// Exercise library and categories
// ============================================================================

fn cmd_exercises(data_dir: &Path, cmd: ExerciseCommand) -> Result<()> {
    let store = Store::new(data_dir);

    match cmd {
        ExerciseCommand::List => {
            let state = load_state(data_dir)?;
            for exercise in state.catalog.iter() {
                println!(
                    "{:<24} {:<32} {:<11} {} × {} {}, rest {}s",
                    exercise.id,
                    exercise.name,
                    exercise.category,
                    exercise.sets,
                    exercise.reps_or_time,
                    exercise.logging_type.unit(),
                    exercise.rest
                );
            }
        }
        ExerciseCommand::Add {
            name,
            category,
            fields,
        } => {
            let id = AppState::update(&store, |state| {
                let mut draft = ExerciseDraft::new(name, category);
                if let Some(sets) = fields.sets {
                    draft.sets = sets;
                }
                if let Some(target) = fields.target {
                    draft.reps_or_time = target;
                }
                if let Some(rest) = fields.rest {
                    draft.rest = rest;
                }
                if let Some(logging) = fields.logging {
                    draft.logging_type = logging.into();
                }
                draft.cues = fields.cues;
                draft.hints = fields.hints;

                state.catalog.add_exercise(draft)
            })?;
            println!("✓ Created exercise {}", id);
        }
        ExerciseCommand::Edit {
            id,
            name,
            category,
            fields,
        } => {
            let patch = ExercisePatch {
                name,
                sets: fields.sets,
                reps_or_time: fields.target,
                rest: fields.rest,
                logging_type: fields.logging.map(Into::into),
                cues: non_empty(fields.cues),
                hints: non_empty(fields.hints),
                category,
            };
            let name = AppState::update(&store, |state| {
                let updated = state.catalog.update_exercise(&id, patch)?;
                Ok(updated.name.clone())
            })?;
            println!("✓ Updated {}", name);
        }
        ExerciseCommand::Remove { id } => {
            let (removed, stale) = AppState::update(&store, |state| {
                let removed = state
                    .catalog
                    .remove_exercise(&id)
                    .ok_or_else(|| Error::Catalog(format!("unknown exercise id: {}", id)))?;
                let stale: usize = state
                    .schedule
                    .iter_week()
                    .map(|(_, steps)| steps.iter().filter(|s| **s == id).count())
                    .sum();
                Ok((removed, stale))
            })?;

            println!("✓ Removed {}", removed.name);
            if stale > 0 {
                println!("  {} planned set(s) still reference it and will be skipped.", stale);
            }
        }
    }

    Ok(())
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn cmd_categories(data_dir: &Path, cmd: CategoryCommand) -> Result<()> {
    let store = Store::new(data_dir);

    match cmd {
        CategoryCommand::List => {
            let state = load_state(data_dir)?;
            for category in state.catalog.categories() {
                println!("{}", category);
            }
        }
        CategoryCommand::Add { name } => {
            AppState::update(&store, |state| state.catalog.add_category(&name))?;
            println!("✓ Added category {}", name.trim());
        }
        CategoryCommand::Remove { name } => {
            AppState::update(&store, |state| {
                if !state.catalog.remove_category(&name) {
                    return Err(Error::Catalog(format!("unknown category: {}", name)));
                }
                Ok(())
            })?;
            println!("✓ Removed category {}", name);
        }
    }

    Ok(())
}

// ============================================================================
// History and export
// ============================================================================

fn cmd_history(data_dir: &Path, clear: bool) -> Result<()> {
    let history_path = Config::history_path(data_dir);

    if clear {
        let count = history::clear_history(&history_path)?;
        println!("✓ Deleted {} workout(s)", count);
        return Ok(());
    }

    let logs = load_history(&history_path)?;
    if logs.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    for log in &logs {
        println!(
            "{}  {:<10} {} sets",
            log.date
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            log.day_id,
            log.sets.len()
        );
        for set in &log.sets {
            println!(
                "    {} #{}: {} {}",
                set.exercise_name,
                set.set_number,
                set.value,
                set.logging_type.unit()
            );
        }
    }

    Ok(())
}

fn cmd_export(data_dir: &Path, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let logs = load_history(&Config::history_path(data_dir))?;
    if logs.is_empty() {
        println!("No workouts to export.");
        return Ok(());
    }

    let output = output
        .unwrap_or_else(|| PathBuf::from(export::default_export_filename(chrono::Utc::now())));
    let rows = export::export_to_path(&logs, &output, &config.export.date_format)?;

    println!("✓ Exported {} sets to {}", rows, output.display());
    Ok(())
}
