//! Persistence Store: the single durable JSON document holding the current profile.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::profile::models::{profile_from_value, KeyCoverage};
use crate::profile::Profile;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exists but is not a valid resume: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode resume: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Whole-record JSON file store at a fixed path. Single writer, no locking.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when the file has never been written.
    pub fn load(&self) -> Result<Option<Profile>, PersistenceError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        let profile = serde_json::from_str::<serde_json::Value>(&raw)
            .and_then(|value| profile_from_value(value, KeyCoverage::All))
            .map_err(|source| PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        info!("Loaded resume from {}", self.path.display());
        Ok(Some(profile))
    }

    /// Overwrites the file with the whole profile. Written to a sibling temp file and
    /// renamed into place, so a crash never leaves half a document behind.
    pub fn save(&self, profile: &Profile) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(profile).map_err(PersistenceError::Encode)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        info!("Saved resume to {}", self.path.display());
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
