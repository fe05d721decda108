//! Persistence of the planner state slices with file locking.
//!
//! Each slice (exercises, categories, schedule) is its own JSON file wrapped
//! in a versioned envelope. Unreadable slices fall back to defaults.

use crate::catalog::{get_default_catalog, ExerciseCatalog};
use crate::schedule::{build_default_schedule, WeeklySchedule};
use crate::{Error, Exercise, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Version tag written into every slice. Bump when a slice's layout changes.
pub const SCHEMA_VERSION: u32 = 2;

const EXERCISES_SLICE: &str = "exercises";
const CATEGORIES_SLICE: &str = "categories";
const SCHEDULE_SLICE: &str = "schedule_v2";

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    schema_version: u32,
    data: T,
}

/// Directory holding the named state slices
#[derive(Clone, Debug)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slice_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Load a slice with shared locking
    ///
    /// Returns `None` if the file doesn't exist, can't be read, fails to
    /// parse or carries a different schema version.
    pub fn load_slice<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.slice_path(name);
        if !path.exists() {
            tracing::info!("No {} slice found, using defaults", name);
            return Ok(None);
        }

        let contents = match read_locked(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Unable to read {:?}: {}. Using defaults.", path, e);
                return Ok(None);
            }
        };

        match serde_json::from_str::<Envelope<T>>(&contents) {
            Ok(envelope) if envelope.schema_version == SCHEMA_VERSION => {
                tracing::debug!("Loaded {} slice from {:?}", name, path);
                Ok(Some(envelope.data))
            }
            Ok(envelope) => {
                tracing::warn!(
                    "{:?} has schema version {} (expected {}). Using defaults.",
                    path,
                    envelope.schema_version,
                    SCHEMA_VERSION
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
                Ok(None)
            }
        }
    }

    /// Save a slice with exclusive locking
    ///
    /// Atomically writes the slice by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save_slice<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.slice_path(name);

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let envelope = Envelope {
                schema_version: SCHEMA_VERSION,
                data,
            };
            let contents = serde_json::to_string(&envelope)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} slice to {:?}", name, path);
        Ok(())
    }
}

fn read_locked(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let unlocked = file.unlock();
    read?;
    unlocked?;
    Ok(contents)
}

/// Everything the planner persists: the exercise library and the week plan
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub catalog: ExerciseCatalog,
    pub schedule: WeeklySchedule,
}

impl Default for AppState {
    fn default() -> Self {
        let catalog = get_default_catalog();
        Self {
            catalog: catalog.clone(),
            schedule: build_default_schedule(catalog),
        }
    }
}

impl AppState {
    /// Load every slice, filling gaps with the built-in defaults
    pub fn load(store: &Store) -> Result<Self> {
        let defaults = get_default_catalog();

        let exercises: Vec<Exercise> = store
            .load_slice(EXERCISES_SLICE)?
            .unwrap_or_else(|| defaults.exercises().to_vec());
        let categories: Vec<String> = store
            .load_slice(CATEGORIES_SLICE)?
            .unwrap_or_else(|| defaults.categories().to_vec());
        let schedule = store
            .load_slice::<BTreeMap<String, crate::DayConfig>>(SCHEDULE_SLICE)?
            .map(WeeklySchedule::from_days)
            .unwrap_or_else(|| build_default_schedule(defaults));

        Ok(Self {
            catalog: ExerciseCatalog::new(exercises, categories),
            schedule,
        })
    }

    pub fn save(&self, store: &Store) -> Result<()> {
        store.save_slice(EXERCISES_SLICE, &self.catalog.exercises())?;
        store.save_slice(CATEGORIES_SLICE, &self.catalog.categories())?;
        store.save_slice(SCHEDULE_SLICE, self.schedule.days())?;
        Ok(())
    }

    /// Load state, modify it, and save it back
    ///
    /// Returns whatever `f` produced, only once the save has succeeded.
    pub fn update<F, T>(store: &Store, f: F) -> Result<T>
    where
        F: FnOnce(&mut AppState) -> Result<T>,
    {
        let mut state = Self::load(store)?;
        let output = f(&mut state)?;
        state.save(store)?;
        Ok(output)
    }
}
