//! Property lookup for template generation.
//!
//! The engine never reads global state. Everything it needs from the
//! surrounding installation (where templates live) comes through the
//! [`PropertySource`] trait, which is handed to the engine at construction.
//!
//! Three properties are consumed, all by the template locator:
//!
//! | Key                     | Meaning                                           |
//! |-------------------------|---------------------------------------------------|
//! | [`TEMPLATE_SEARCH_PATH`]| Comma-separated extra template directories        |
//! | [`HOME_DIRECTORY`]      | Install root; `<root>/share/templates` is searched |
//! | [`PREPARE_DIRECTORY`]   | Staging directory, searched last                  |
//!
//! [`GeneratorConfig`] is the file-backed implementation used by the CLI:
//!
//! ```toml
//! template_search_path = ["/etc/app/templates", "~/templates"]
//! home_directory = "/opt/app"
//! prepare_directory = "/opt/app/staging"
//! watch_registry = "/opt/app/.generated.json"
//!
//! [properties]
//! cluster_name = "east"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Comma-separated list of additional template directories.
pub const TEMPLATE_SEARCH_PATH: &str = "template_search_path";

/// Install root; templates are looked up under `share/templates` beneath it.
pub const HOME_DIRECTORY: &str = "home_directory";

/// Staging directory searched after every other location.
pub const PREPARE_DIRECTORY: &str = "prepare_directory";

/// Supplies string properties to the engine.
///
/// Implemented for plain maps so tests and embedders can pass properties
/// without building a [`GeneratorConfig`].
pub trait PropertySource {
    /// Look up a property by key, returning `None` when it is not set.
    fn property(&self, key: &str) -> Option<String>;
}

impl PropertySource for HashMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl PropertySource for BTreeMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn property(&self, key: &str) -> Option<String> {
        (**self).property(key)
    }
}

/// File-backed generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Extra template directories, searched first and in order.
    ///
    /// Entries may use `~` and environment variables; they are expanded when
    /// the property is read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_search_path: Vec<String>,

    /// Install root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_directory: Option<PathBuf>,

    /// Staging directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepare_directory: Option<PathBuf>,

    /// Where generated files are registered for drift detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_registry: Option<PathBuf>,

    /// Free-form properties, returned verbatim by [`PropertySource::property`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl GeneratorConfig {
    /// Load configuration from an optional path.
    ///
    /// Falls back to [`GeneratorConfig::default_path`] when no path is given,
    /// and to an empty configuration when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(_) => return Ok(Self::default()),
            },
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No generator config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read generator config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse generator config from {}", path.display()))
    }

    /// Write configuration as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize generator config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write generator config to {}", path.display()))
    }

    /// Default config location: `~/.tmplgen/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".tmplgen").join("config.toml"))
    }
}

impl PropertySource for GeneratorConfig {
    fn property(&self, key: &str) -> Option<String> {
        match key {
            TEMPLATE_SEARCH_PATH => Some(
                self.template_search_path
                    .iter()
                    .map(|entry| {
                        shellexpand::full(entry)
                            .map(|expanded| expanded.into_owned())
                            .unwrap_or_else(|_| entry.clone())
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            HOME_DIRECTORY => self.home_directory.as_ref().map(|p| p.display().to_string()),
            PREPARE_DIRECTORY => self.prepare_directory.as_ref().map(|p| p.display().to_string()),
            _ => self.properties.get(key).cloned(),
        }
    }
}
