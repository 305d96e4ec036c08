//! Durable key-value persistence of the whole store state.
//!
//! Each logical key holds one JSON document. Reads that fail fall back to
//! samples/defaults with a warning; writes that fail are reported to the
//! caller, which keeps its in-memory state authoritative.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::history::{HistoryEntry, HistoryLog};
use crate::models::{Conference, Task};
use crate::preferences::{ColorPalette, Settings};
use crate::samples::{sample_conferences, sample_tasks};

pub const TASKS_KEY: &str = "timeline_tasks";
pub const CONFERENCES_KEY: &str = "timeline_conferences";
pub const HISTORY_KEY: &str = "timeline_history";
pub const SETTINGS_KEY: &str = "timeline_settings";
pub const COLORS_KEY: &str = "timeline_colors";

/// A durable string-to-string medium.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    // Write to a sibling temp file, then rename over the target.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// In-memory medium. Clones share the same map, so a test can keep a handle
/// and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().clone()
    }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.entries.lock().insert(key.to_string(), value.into());
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Serialize)]
struct StoredHistoryRef<'a> {
    entries: &'a [HistoryEntry],
    index: usize,
}

#[derive(Deserialize)]
struct StoredHistory {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
    index: Option<i64>,
}

/// Where the task/conference collections came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read back from the medium.
    Stored,
    /// Nothing stored yet; seeded from samples (or empty).
    Fresh,
    /// Stored data was unreadable and was replaced.
    Recovered,
}

#[derive(Debug)]
pub struct LoadedState {
    pub tasks: Vec<Task>,
    pub conferences: Vec<Conference>,
    pub history: HistoryLog,
    pub settings: Settings,
    pub colors: ColorPalette,
    pub source: LoadSource,
}

/// Borrowed view of everything that gets written out.
pub struct StateRef<'a> {
    pub tasks: &'a [Task],
    pub conferences: &'a [Conference],
    pub history: &'a HistoryLog,
    pub settings: &'a Settings,
    pub colors: &'a ColorPalette,
}

pub struct PersistenceAdapter {
    medium: Box<dyn KeyValueStore>,
    seed_samples: bool,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("seed_samples", &self.seed_samples)
            .finish_non_exhaustive()
    }
}

type StoredRecords = (Option<Vec<Task>>, Option<Vec<Conference>>, Option<StoredHistory>);

impl PersistenceAdapter {
    pub fn new(medium: impl KeyValueStore + 'static, seed_samples: bool) -> Self {
        Self {
            medium: Box::new(medium),
            seed_samples,
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, PersistError> {
        match self.medium.get(key)? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| PersistError::Decode { key, source }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), PersistError> {
        let text = serde_json::to_string(value).map_err(|source| PersistError::Encode { key, source })?;
        self.medium.set(key, &text)
    }

    fn read_records(&self) -> Result<StoredRecords, PersistError> {
        Ok((
            self.read(TASKS_KEY)?,
            self.read(CONFERENCES_KEY)?,
            self.read(HISTORY_KEY)?,
        ))
    }

    fn seed_tasks(&self) -> Vec<Task> {
        if self.seed_samples { sample_tasks() } else { Vec::new() }
    }

    fn seed_conferences(&self) -> Vec<Conference> {
        if self.seed_samples { sample_conferences() } else { Vec::new() }
    }

    fn load_settings(&self) -> Settings {
        let settings = match self.read::<Settings>(SETTINGS_KEY) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read settings, using defaults");
                return Settings::default();
            }
        };
        match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                tracing::warn!(error = %err, "stored settings are invalid, using defaults");
                Settings::default()
            }
        }
    }

    fn load_colors(&self) -> ColorPalette {
        match self.read::<ColorPalette>(COLORS_KEY) {
            Ok(colors) => colors.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read colors, using defaults");
                ColorPalette::default()
            }
        }
    }

    /// Loads everything, never failing. An empty `history` in the result means
    /// the caller must record an initial entry.
    pub fn load(&self) -> LoadedState {
        let settings = self.load_settings();
        let colors = self.load_colors();

        let (tasks, conferences, history, source) = match self.read_records() {
            Ok((tasks, conferences, stored_history)) => {
                let source = if tasks.is_some() || conferences.is_some() || stored_history.is_some() {
                    LoadSource::Stored
                } else {
                    LoadSource::Fresh
                };
                let history = stored_history
                    .map(|h| HistoryLog::restore(h.entries, h.index, settings.max_history_entries))
                    .unwrap_or_default();
                (
                    tasks.unwrap_or_else(|| self.seed_tasks()),
                    conferences.unwrap_or_else(|| self.seed_conferences()),
                    history,
                    source,
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored records are unreadable, starting over");
                (self.seed_tasks(), self.seed_conferences(), HistoryLog::new(), LoadSource::Recovered)
            }
        };

        tracing::info!(
            ?source,
            tasks = tasks.len(),
            conferences = conferences.len(),
            history = history.len(),
            "loaded timeline state"
        );

        LoadedState {
            tasks,
            conferences,
            history,
            settings,
            colors,
            source,
        }
    }

    /// Writes every key. Stops at the first failure.
    pub fn save(&mut self, state: StateRef<'_>) -> Result<(), PersistError> {
        self.write(TASKS_KEY, state.tasks)?;
        self.write(CONFERENCES_KEY, state.conferences)?;
        self.write(
            HISTORY_KEY,
            &StoredHistoryRef {
                entries: state.history.entries(),
                index: state.history.index(),
            },
        )?;
        self.write(SETTINGS_KEY, state.settings)?;
        self.write(COLORS_KEY, state.colors)?;
        Ok(())
    }
}
