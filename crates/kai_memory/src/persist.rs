//! JSON-file persistence for the durable stores.
//!
//! Every store is one pretty-printed JSON document under the data
//! directory. Loading never aborts startup: a missing or corrupt file
//! yields the default value and reports where the value came from.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where a loaded value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    File,
    Missing,
    Corrupt(String),
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub origin: LoadOrigin,
}

impl<T> Loaded<T> {
    pub fn from_file(&self) -> bool {
        self.origin == LoadOrigin::File
    }
}

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| PersistError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Load a store, falling back to `T::default()` on any failure.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Loaded<T> {
    match load_json(path) {
        Ok(Some(value)) => {
            tracing::debug!("Loaded {}", path.display());
            Loaded {
                value,
                origin: LoadOrigin::File,
            }
        }
        Ok(None) => Loaded {
            value: T::default(),
            origin: LoadOrigin::Missing,
        },
        Err(e) => {
            tracing::warn!("{}; starting from defaults", e);
            Loaded {
                value: T::default(),
                origin: LoadOrigin::Corrupt(e.to_string()),
            }
        }
    }
}

/// Write a store. Goes through a temp file and a rename so a crash
/// mid-write leaves the previous version intact.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// File layout of the data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn memory(&self) -> PathBuf {
        self.root.join("memory.json")
    }

    pub fn social(&self) -> PathBuf {
        self.root.join("social.json")
    }

    pub fn conversation(&self) -> PathBuf {
        self.root.join("conversation.json")
    }

    pub fn user_profile(&self) -> PathBuf {
        self.root.join("user_profile.json")
    }

    pub fn life_events(&self) -> PathBuf {
        self.root.join("life_events.json")
    }
}
