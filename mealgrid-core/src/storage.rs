//! Plan persistence.
//!
//! The store is keyed by plan id and always receives the full snapshot;
//! there is no versioning and the last write wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use crate::models::PlanSnapshot;

pub trait PlanStore {
    /// Returns `Ok(None)` when no plan with `id` has been saved.
    fn load(&self, id: &Uuid) -> Result<Option<PlanSnapshot>, StorageError>;

    /// Overwrites the stored copy of the plan.
    fn save(&self, plan: &PlanSnapshot) -> Result<(), StorageError>;

    fn list(&self) -> Result<Vec<Uuid>, StorageError>;
}

/// Stores each plan as a pretty-printed JSON file named `<id>.json`.
#[derive(Debug, Clone)]
pub struct FilePlanStore {
    data_dir: PathBuf,
}

impl FilePlanStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the full path for a plan.
    pub fn path(&self, id: &Uuid) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }
}

impl PlanStore for FilePlanStore {
    fn load(&self, id: &Uuid) -> Result<Option<PlanSnapshot>, StorageError> {
        let path = self.path(id);

        match fs::read(&path) {
            Ok(bytes) => {
                let plan = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Parse(path, e))?;
                Ok(Some(plan))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    /// Creates the data directory if it doesn't exist.
    fn save(&self, plan: &PlanSnapshot) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(&plan.id);
        let json =
            serde_json::to_vec_pretty(plan).map_err(|e| StorageError::Parse(path.clone(), e))?;

        fs::write(&path, json).map_err(|e| StorageError::Io(path, e))?;
        tracing::debug!("Saved plan {} to {}", plan.id, self.data_dir.display());

        Ok(())
    }

    /// Ids of every `<uuid>.json` file in the data directory, sorted. Other
    /// files are ignored; a missing directory lists as empty.
    fn list(&self) -> Result<Vec<Uuid>, StorageError> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(self.data_dir.clone(), e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// In-process store, keyed by plan id.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: Mutex<BTreeMap<Uuid, PlanSnapshot>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryPlanStore {
    fn load(&self, id: &Uuid) -> Result<Option<PlanSnapshot>, StorageError> {
        Ok(self.plans.lock()?.get(id).cloned())
    }

    fn save(&self, plan: &PlanSnapshot) -> Result<(), StorageError> {
        self.plans.lock()?.insert(plan.id, plan.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Uuid>, StorageError> {
        Ok(self.plans.lock()?.keys().copied().collect())
    }
}

/// Errors that can occur during plan storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    Io(PathBuf, io::Error),
    /// The file is not a valid plan snapshot.
    Parse(PathBuf, serde_json::Error),
    /// The in-memory store was poisoned by a panicking writer.
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(path, e) => write!(f, "I/O error for {}: {}", path.display(), e),
            StorageError::Parse(path, e) => {
                write!(f, "Failed to parse plan {}: {}", path.display(), e)
            }
            StorageError::Poisoned => write!(f, "Plan store lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(_, e) => Some(e),
            StorageError::Parse(_, e) => Some(e),
            StorageError::Poisoned => None,
        }
    }
}
