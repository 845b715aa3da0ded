//! Registration of generated files for drift detection.
//!
//! After a file is written the engine calls [`FileWatcher::watch_file`] so
//! that a later run can tell whether someone edited the generated output by
//! hand. [`WatchRegistry`] keeps a JSON record of each file's SHA-256 at
//! generation time; [`NoopWatcher`] disables registration.
//!
//! ```json
//! {
//!   "version": 1,
//!   "files": {
//!     "/etc/app/server.properties": {
//!       "checksum": "sha256:2cf24d...",
//!       "generated_at": "2026-10-19T09:15:02Z"
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PropertySource;
use crate::utils::fs::{calculate_checksum, read_json_file, write_json_file};

/// Receives the path of every file the engine writes.
pub trait FileWatcher {
    /// Register `path`, written using `config`, for future drift checks.
    ///
    /// # Errors
    ///
    /// Implementations report registration failures; the engine propagates them.
    fn watch_file(&self, path: &Path, config: &dyn PropertySource) -> Result<()>;
}

/// A watcher that registers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWatcher;

impl FileWatcher for NoopWatcher {
    fn watch_file(&self, path: &Path, _config: &dyn PropertySource) -> Result<()> {
        debug!("Not registering {} for drift detection", path.display());
        Ok(())
    }
}

const REGISTRY_VERSION: u32 = 1;

fn registry_version() -> u32 {
    REGISTRY_VERSION
}

/// One registered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedFile {
    /// `sha256:<hex>` of the content as generated
    pub checksum: String,
    /// When the file was registered
    pub generated_at: DateTime<Utc>,
}

/// On-disk content of a [`WatchRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedFiles {
    /// Format version
    #[serde(default = "registry_version")]
    pub version: u32,
    /// Registered files keyed by path
    #[serde(default)]
    pub files: BTreeMap<PathBuf, WatchedFile>,
}

impl Default for WatchedFiles {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            files: BTreeMap::new(),
        }
    }
}

/// A file-backed record of generated files and their checksums.
#[derive(Debug, Clone)]
pub struct WatchRegistry {
    path: PathBuf,
}

impl WatchRegistry {
    /// Use the registry stored at `path`; the file is created on first registration.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Location of the registry file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the registry, returning an empty one when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<WatchedFiles> {
        if self.path.exists() {
            read_json_file(&self.path)
        } else {
            Ok(WatchedFiles::default())
        }
    }

    /// Record the current checksum of `file`, replacing any earlier record.
    ///
    /// Relative paths are recorded against the current directory so the
    /// registry can be checked from anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` cannot be read or the registry cannot be written.
    pub fn register(&self, file: &Path) -> Result<()> {
        let file = std::path::absolute(file)
            .with_context(|| format!("Failed to resolve path: {}", file.display()))?;
        let mut watched = self.load()?;
        let checksum = calculate_checksum(&file)?;

        watched.files.insert(
            file.clone(),
            WatchedFile {
                checksum,
                generated_at: Utc::now(),
            },
        );

        write_json_file(&self.path, &watched, true)?;
        info!("Watching {} for modifications", file.display());
        Ok(())
    }

    /// Registered files whose content no longer matches the recorded checksum.
    ///
    /// Deleted files are reported as modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be loaded or an existing file
    /// cannot be read.
    pub fn modified_files(&self) -> Result<Vec<PathBuf>> {
        let watched = self.load()?;
        let mut modified = Vec::new();

        for (path, record) in &watched.files {
            if !path.exists() {
                modified.push(path.clone());
                continue;
            }
            if calculate_checksum(path)? != record.checksum {
                modified.push(path.clone());
            }
        }

        Ok(modified)
    }
}

impl FileWatcher for WatchRegistry {
    fn watch_file(&self, path: &Path, _config: &dyn PropertySource) -> Result<()> {
        self.register(path)
    }
}
