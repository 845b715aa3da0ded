//! Writing resolved documents to disk.
//!
//! A generated file is laid out as:
//!
//! ```text
//! # AUTO-GENERATED: 2026-10-19T09:15:02+02:00
//! first resolved line
//! second resolved line
//! ```
//!
//! The header is optional, and so is the POSIX mode applied to the file
//! before its content is written. Writes go to the target in place.

use anyhow::{Context, Result};
use chrono::{Local, SecondsFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::utils::fs::ensure_parent_dir;

/// Prefix of the generation header line.
pub const HEADER_PREFIX: &str = "# AUTO-GENERATED: ";

/// How a document is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Write the `# AUTO-GENERATED` header line
    pub timestamp: bool,
    /// Notify the watcher after writing
    pub watch_file: bool,
    /// POSIX permission bits applied to the output file
    pub mode: Option<u32>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            timestamp: true,
            watch_file: true,
            mode: None,
        }
    }
}

/// What [`crate::templating::Transformer::emit`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    /// No output target was configured; the resolved document as text
    Text(String),
    /// The document was written to this path
    Written(PathBuf),
}

/// The ordered lines being generated.
///
/// The first `resolved` lines are already in their final form; the rest are
/// raw template lines waiting to be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    resolved: usize,
}

impl Document {
    /// A document holding `lines`, none of them resolved.
    #[must_use]
    pub const fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            resolved: 0,
        }
    }

    /// The current lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether every line has been resolved.
    #[must_use]
    pub const fn is_rendered(&self) -> bool {
        self.resolved == self.lines.len()
    }

    /// Lines not yet resolved.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.lines[self.resolved..]
    }

    /// Append a raw line; it stays pending until the next render.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Replace the pending lines with their resolved form.
    pub(crate) fn resolve_pending(&mut self, resolved: Vec<String>) {
        self.lines.truncate(self.resolved);
        self.lines.extend(resolved);
        self.resolved = self.lines.len();
    }

    /// Map every line through `f`.
    ///
    /// Mapped lines are raw input again and are all resolved on the next render.
    pub fn map_lines<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for line in &mut self.lines {
            *line = f(line);
        }
        self.resolved = 0;
    }

    /// Lines joined with `\n`, without a trailing newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// The generation header for the current local time.
#[must_use]
pub fn timestamp_header() -> String {
    format!("{HEADER_PREFIX}{}", Local::now().to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Write `lines` to `path`, each terminated by `\n`.
///
/// The file is created or truncated, `options.mode` is applied, the header is
/// written when `options.timestamp` is set, then the lines follow. Missing
/// parent directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be created, its mode cannot be set, or
/// a write fails.
pub fn write_document(path: &Path, lines: &[String], options: &OutputOptions) -> Result<()> {
    info!("Writing {}", path.display());
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    if let Some(mode) = options.mode {
        set_mode(&file, path, mode)?;
    }

    let mut writer = BufWriter::new(file);
    if options.timestamp {
        writeln!(writer, "{}", timestamp_header())
            .with_context(|| format!("Failed to write header to: {}", path.display()))?;
    }
    for line in lines {
        writeln!(writer, "{line}")
            .with_context(|| format!("Failed to write to: {}", path.display()))?;
    }
    writer.flush().with_context(|| format!("Failed to flush: {}", path.display()))?;

    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &File, path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set mode {mode:o} on: {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, path: &Path, mode: u32) -> Result<()> {
    tracing::warn!("Ignoring mode {mode:o} for {} on this platform", path.display());
    Ok(())
}
