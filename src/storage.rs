//! Persisted local state: a small key/value store of JSON files.
//!
//! Each key maps to `<dir>/<key>.json` holding `{"state": ..., "version": 0}`.
//! Undo history is never stored.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{Layout, Theme};

/// Document, theme and pane widths.
pub const EDITOR_KEY: &str = "zenith-storage";
/// Google Drive session.
pub const AUTH_KEY: &str = "google-auth-storage";

const STORAGE_VERSION: u32 = 0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt stored value for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What the editor keeps between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEditor {
    pub markdown: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(flatten)]
    pub layout: Layout,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/zenith` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("zenith"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read `key`, or `None` when nothing was stored.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        let envelope: Envelope<T> =
            serde_json::from_str(&raw).map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })?;
        Ok(Some(envelope.state))
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let envelope = Envelope {
            state: value,
            version: STORAGE_VERSION,
        };
        let json = serde_json::to_vec_pretty(&envelope).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        let path = self.path_for(key);
        atomic_write(&path, &json).map_err(|source| StorageError::Io { path, source })?;
        tracing::debug!(key, "persisted state");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// Write through a sibling temp file and rename over the target.
///
/// The temp file is removed if any step fails, so the target is either
/// untouched or fully written.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = (|| {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        writer.write_all(data)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
