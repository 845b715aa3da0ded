//! Template lookup across the layered search path.
//!
//! Templates are found by searching an ordered list of directories:
//!
//! 1. Every entry of the comma-separated [`TEMPLATE_SEARCH_PATH`] property that
//!    exists on disk as a directory, in the order given
//! 2. `<HOME_DIRECTORY>/share/templates`
//! 3. [`PREPARE_DIRECTORY`]
//!
//! # Lookup Modes
//!
//! - [`TemplateLocator::locate_one`] returns the first `directory/pattern` that
//!   exists. Earlier directories shadow later ones.
//! - [`TemplateLocator::locate_many`] glob-expands every pattern in every
//!   directory and keeps the first file seen for each basename. The result is
//!   ordered by basename, not by discovery order, so include-all output is
//!   stable however the directories are layered.
//!
//! # Pattern Syntax
//!
//! Multi-file lookup uses shell-style globs relative to each directory:
//!
//! - `*` matches any sequence of characters within one path component
//! - `?` matches a single character
//! - `[abc]` / `[a-z]` match a character set or range
//! - `**` matches any number of path components
//!
//! Wildcards never match a leading `.`, so hidden files are only found by
//! patterns that spell the dot out.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tmplgen_cli::pattern::TemplateLocator;
//! use std::path::PathBuf;
//!
//! # fn example() -> anyhow::Result<()> {
//! let locator = TemplateLocator::new(vec![
//!     PathBuf::from("/etc/app/templates"),
//!     PathBuf::from("/opt/app/share/templates"),
//! ]);
//!
//! let main = locator.locate_one("server.properties.tpl")?;
//! let fragments = locator.locate_many(&["conf.d/*.tpl".to_string()])?;
//! println!("{} plus {} fragments", main.display(), fragments.len());
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::config::{HOME_DIRECTORY, PREPARE_DIRECTORY, PropertySource, TEMPLATE_SEARCH_PATH};
use crate::core::TemplateError;

/// Glob options that mirror shell expansion.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Finds template files in an ordered list of directories.
#[derive(Debug, Clone, Default)]
pub struct TemplateLocator {
    directories: Vec<PathBuf>,
}

impl TemplateLocator {
    /// Create a locator over an explicit directory list, used as given.
    #[must_use]
    pub const fn new(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
        }
    }

    /// Build the search path from installation properties.
    ///
    /// Entries of the extra search path that do not exist as directories are
    /// dropped. The two fallback directories are always appended when their
    /// property is set, whether or not they exist yet.
    #[must_use]
    pub fn from_properties(properties: &dyn PropertySource) -> Self {
        let mut directories = Vec::new();

        if let Some(search_path) = properties.property(TEMPLATE_SEARCH_PATH) {
            for entry in search_path.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let path = PathBuf::from(entry);
                if path.is_dir() {
                    directories.push(path);
                } else {
                    trace!("Ignoring missing template directory {}", entry);
                }
            }
        }

        if let Some(home) = properties.property(HOME_DIRECTORY) {
            directories.push(Path::new(&home).join("share").join("templates"));
        }

        if let Some(prepare) = properties.property(PREPARE_DIRECTORY) {
            directories.push(PathBuf::from(prepare));
        }

        debug!("Template search directories: {:?}", directories);
        Self::new(directories)
    }

    /// The directories searched, in precedence order.
    #[must_use]
    pub fn search_directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Find the first `directory/pattern` that exists.
    ///
    /// An absolute `pattern` is checked as-is in the first iteration, since
    /// joining an absolute path replaces the directory.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::TemplateNotFound`] when no directory contains
    /// the pattern, including when the search path is empty.
    pub fn locate_one(&self, pattern: &str) -> Result<PathBuf> {
        if !pattern.is_empty() {
            for dir in &self.directories {
                let candidate = dir.join(pattern);
                trace!("Checking {}", candidate.display());
                if candidate.exists() {
                    debug!("Found template '{}' at {}", pattern, candidate.display());
                    return Ok(candidate);
                }
            }
        }

        Err(TemplateError::TemplateNotFound {
            pattern: pattern.to_string(),
            searched: self.directories.clone(),
        }
        .into())
    }

    /// Find every file matching any of `patterns`, one per basename.
    ///
    /// Directories are visited in precedence order and, within a directory,
    /// patterns in list order. The first file recorded for a basename wins.
    /// The result is sorted by basename. Matching nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidSearchPattern`] if a pattern is not
    /// valid glob syntax.
    pub fn locate_many<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<PathBuf>> {
        let mut templates: BTreeMap<OsString, PathBuf> = BTreeMap::new();

        for dir in &self.directories {
            let escaped_dir = Pattern::escape(&dir.to_string_lossy());

            for pattern in patterns {
                let pattern = pattern.as_ref();
                let full_pattern = format!("{escaped_dir}/{pattern}");

                let paths = glob::glob_with(&full_pattern, GLOB_OPTIONS).map_err(|e| {
                    TemplateError::InvalidSearchPattern {
                        pattern: pattern.to_string(),
                        reason: e.msg.to_string(),
                    }
                })?;

                for entry in paths {
                    let file = match entry {
                        Ok(file) => file,
                        Err(e) => {
                            warn!("Skipping unreadable template candidate: {}", e);
                            continue;
                        }
                    };

                    let Some(base) = file.file_name().map(OsString::from) else {
                        continue;
                    };

                    if let Some(existing) = templates.get(&base) {
                        trace!("{} shadowed by {}", file.display(), existing.display());
                    } else {
                        templates.insert(base, file);
                    }
                }
            }
        }

        debug!(
            "Found {} templates for patterns {:?}",
            templates.len(),
            patterns.iter().map(AsRef::as_ref).collect::<Vec<&str>>()
        );
        Ok(templates.into_values().collect())
    }
}
