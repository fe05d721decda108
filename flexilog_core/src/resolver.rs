//! Step resolution over a day's flattened step sequence.
//!
//! Every function here recomputes from the authoritative `steps` slice by a
//! linear scan. Duplicate ids may be non-contiguous, so set numbers are only
//! ever derived by counting identity matches up to a position.

use crate::{Exercise, ExerciseCatalog};

/// Where one occurrence of an exercise sits relative to the session cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetProgress {
    Completed,
    Current,
    Upcoming,
}

/// The exercise planned at `index`, if the index is in bounds and the id
/// still resolves in the catalog
pub fn exercise_at<'a>(
    steps: &[String],
    catalog: &'a ExerciseCatalog,
    index: usize,
) -> Option<&'a Exercise> {
    steps.get(index).and_then(|id| catalog.get(id))
}

/// 1-based count of how many times `steps[index]` has appeared up to and
/// including `index`. Returns 0 for an out-of-bounds index.
pub fn ordinal_set_number(steps: &[String], index: usize) -> u32 {
    match steps.get(index) {
        Some(id) => steps[..=index].iter().filter(|s| *s == id).count() as u32,
        None => 0,
    }
}

/// Number of times `exercise_id` appears anywhere in the day
pub fn total_occurrences(steps: &[String], exercise_id: &str) -> u32 {
    steps.iter().filter(|s| s.as_str() == exercise_id).count() as u32
}

/// Positions in `steps` that belong to `exercise_id`, in order
pub fn occurrence_indices(steps: &[String], exercise_id: &str) -> Vec<usize> {
    steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.as_str() == exercise_id)
        .map(|(i, _)| i)
        .collect()
}

/// Classify each occurrence of `exercise_id` against the session cursor
pub fn set_progress(
    steps: &[String],
    exercise_id: &str,
    step_index: usize,
) -> Vec<(usize, SetProgress)> {
    occurrence_indices(steps, exercise_id)
        .into_iter()
        .map(|idx| {
            let progress = if idx < step_index {
                SetProgress::Completed
            } else if idx == step_index {
                SetProgress::Current
            } else {
                SetProgress::Upcoming
            };
            (idx, progress)
        })
        .collect()
}

/// Index of the first step at or after `from` whose id resolves
pub fn next_resolvable(steps: &[String], catalog: &ExerciseCatalog, from: usize) -> usize {
    (from..steps.len())
        .find(|&i| exercise_at(steps, catalog, i).is_some())
        .unwrap_or(steps.len())
}

/// Editor label for a step, e.g. "Dips (Set 2)"; stale ids read "Unknown"
pub fn step_label(steps: &[String], catalog: &ExerciseCatalog, index: usize) -> String {
    match exercise_at(steps, catalog, index) {
        Some(exercise) => format!(
            "{} (Set {})",
            exercise.name,
            ordinal_set_number(steps, index)
        ),
        None => "Unknown".to_string(),
    }
}

/// Distinct resolvable exercises in order of first appearance
pub fn unique_exercises<'a>(steps: &[String], catalog: &'a ExerciseCatalog) -> Vec<&'a Exercise> {
    let mut seen: Vec<&str> = Vec::new();
    let mut result = Vec::new();

    for id in steps {
        if seen.contains(&id.as_str()) {
            continue;
        }
        seen.push(id);
        if let Some(exercise) = catalog.get(id) {
            result.push(exercise);
        }
    }

    result
}
