//! Test utilities for tmplgen
//!
//! Helpers shared by unit and integration tests: one-time logging setup and a
//! temporary template tree wired to a configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use tmplgen_cli::test_utils::TemplateTree;
//! use tmplgen_cli::templating::Transformer;
//!
//! let tree = TemplateTree::new().unwrap();
//! tree.add_template("app.tpl", "port=@{port|80}").unwrap();
//!
//! let mut engine = Transformer::new(tree.properties(), None);
//! engine.load_template("app.tpl").unwrap();
//! ```

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{GeneratorConfig, TEMPLATE_SEARCH_PATH};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays
/// off. Only the first call has any effect.
///
/// ```bash
/// RUST_LOG=tmplgen_cli=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

/// A temporary directory holding a `templates/` search directory.
///
/// Everything is removed when the value is dropped.
pub struct TemplateTree {
    temp_dir: TempDir,
}

impl TemplateTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("templates"))?;
        Ok(Self {
            temp_dir,
        })
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The template search directory.
    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        self.root().join("templates")
    }

    /// Write a template below the search directory, creating subdirectories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn add_template(&self, name: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.templates_dir().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a file relative to the root, outside the search directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn add_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Properties pointing the template search path at this tree.
    #[must_use]
    pub fn properties(&self) -> HashMap<String, String> {
        let mut properties = HashMap::new();
        properties.insert(
            TEMPLATE_SEARCH_PATH.to_string(),
            self.templates_dir().display().to_string(),
        );
        properties
    }

    /// A [`GeneratorConfig`] searching this tree and registering generated
    /// files in `watched.json` at the root.
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            template_search_path: vec![self.templates_dir().display().to_string()],
            watch_registry: Some(self.root().join("watched.json")),
            ..GeneratorConfig::default()
        }
    }

    /// Write [`TemplateTree::generator_config`] to `config.toml` at the root
    /// and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_config(&self) -> Result<PathBuf> {
        let path = self.root().join("config.toml");
        fs::write(&path, toml::to_string_pretty(&self.generator_config())?)?;
        Ok(path)
    }
}
