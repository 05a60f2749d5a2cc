use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;
use crate::models::Task;
use crate::store::TaskRepository;

/// Name of the storage slot holding the task collection.
pub const SLOT_NAME: &str = "daily-routine-tasks";

/// Environment variable overriding the slot path.
pub const DB_ENV: &str = "ROUTINE_DB";

/// Returns the path to the task slot (`daily-routine-tasks.json`).
///
/// The path is determined in the following order:
/// 1. `ROUTINE_DB` environment variable.
/// 2. `~/.local/share/routinely/daily-routine-tasks.json` (on Linux).
/// 3. `./daily-routine-tasks.json` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var(DB_ENV).map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("routinely");
        p.push(format!("{}.json", SLOT_NAME));
        p
    })
}

/// Stores the collection as a pretty-printed JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileRepository { path: path.into() }
    }

    /// Repository at [`db_path`].
    pub fn from_env() -> Self {
        Self::new(db_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TaskRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no task slot yet");
            return Ok(Vec::new());
        }
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&s)?)
    }

    /// Writes a sibling `.tmp` file and renames it over the slot, so a crash
    /// mid-write leaves the previous collection intact.
    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let s = serde_json::to_string_pretty(tasks)?;
        let tmp = self.tmp_path();
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        f.write_all(s.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }
}
