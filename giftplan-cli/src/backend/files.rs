use giftplan_core::{PlannerSnapshot, PlannerStorage};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Snapshots stored as `<dir>/<slot>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid slot name {0:?}")]
    InvalidSlot(String),
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl PlannerStorage for FileStorage {
    type Error = StorageError;

    fn save_snapshot(&self, slot: &str, snapshot: &PlannerSnapshot) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, snapshot.to_json()?)?;
        log::debug!("saved slot {slot}");
        Ok(())
    }

    fn load_snapshot(&self, slot: &str) -> Result<Option<PlannerSnapshot>, Self::Error> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(path) {
            Ok(json) => Ok(Some(PlannerSnapshot::from_json(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
