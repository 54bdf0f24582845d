//! Business-profile overrides on disk.
//!
//! Only the user's edits are stored, as a partial JSON document. The
//! effective profile is always rebuilt from the defaults plus that document,
//! so the defaults themselves are never written back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::{Error as SerdeError, Map, Value};
use tracing::{debug, warn};

use crate::domain::profile::{deep_merge, BusinessProfile};
use crate::domain::validation::EstimateError;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "PavingEstimator";
const APP_NAME: &str = "PavingEstimator";
const OVERRIDES_FILE: &str = "business_profile.json";

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error("profile overrides must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
    #[error(transparent)]
    Invalid(#[from] EstimateError),
}

pub fn overrides_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(OVERRIDES_FILE))
}

/// Reads stored overrides. A missing or unreadable file yields `None`.
pub fn load_overrides_from(path: &Path) -> Option<Value> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored profile overrides");
            return None;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read profile overrides");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&data) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            warn!(path = %path.display(), "profile overrides are not a JSON object; ignoring");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to parse profile overrides");
            None
        }
    }
}

/// Merges `patch` into whatever is stored at `path` and writes the result.
///
/// The patch is checked against the defaults first so an invalid edit never
/// reaches disk.
pub fn save_overrides_to(path: &Path, patch: &Value) -> Result<Value, ProfileStoreError> {
    if !patch.is_object() {
        return Err(ProfileStoreError::NotAnObject);
    }
    let mut merged = load_overrides_from(path).unwrap_or_else(|| Value::Object(Map::new()));
    deep_merge(&mut merged, patch);
    BusinessProfile::default().with_overrides(&merged)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&merged)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "saved profile overrides");
    Ok(merged)
}

pub fn clear_overrides_at(path: &Path) -> Result<(), ProfileStoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Defaults with the stored overrides applied. Overrides that no longer
/// validate are ignored rather than failing the caller.
pub fn effective_profile_from(path: &Path) -> BusinessProfile {
    let defaults = BusinessProfile::default();
    let Some(overrides) = load_overrides_from(path) else {
        return defaults;
    };
    match defaults.with_overrides(&overrides) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "stored profile overrides rejected");
            defaults
        }
    }
}

pub fn load_overrides() -> Option<Value> {
    load_overrides_from(&overrides_file()?)
}

pub fn save_overrides(patch: &Value) -> Result<Value, ProfileStoreError> {
    let path = overrides_file().ok_or(ProfileStoreError::StorageUnavailable)?;
    save_overrides_to(&path, patch)
}

pub fn clear_overrides() -> Result<(), ProfileStoreError> {
    let path = overrides_file().ok_or(ProfileStoreError::StorageUnavailable)?;
    clear_overrides_at(&path)
}

pub fn effective_profile() -> BusinessProfile {
    match overrides_file() {
        Some(path) => effective_profile_from(&path),
        None => BusinessProfile::default(),
    }
}
