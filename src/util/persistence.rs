//! Favorite items survive restarts as a single JSON array in the platform
//! config directory. Loaded once at startup, written back on every toggle;
//! last write wins, there are no concurrent writers.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde_json::Error as SerdeError;

use crate::domain::PersistedState;

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "SealScanner";
const APP_NAME: &str = "SealScanner";

fn favorites_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("favorites.json"))
}

/// A missing or unreadable file simply means "no favorites yet".
pub fn load_favorites() -> Option<PersistedState> {
    let path = favorites_file()?;
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn save_favorites(state: &PersistedState) -> Result<(), PersistSaveError> {
    let path = favorites_file().ok_or(PersistSaveError::StorageUnavailable)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
