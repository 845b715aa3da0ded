//! File system helpers shared by the locator, the output writer and the
//! watch registry.
//!
//! All helpers attach the offending path as [`anyhow::Context`] while keeping
//! the underlying [`std::io::Error`] reachable by downcast.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Create a directory and its parents if missing.
///
/// # Errors
///
/// Returns an error if creation fails or the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Create the parent directory of `path` if it has one.
///
/// # Errors
///
/// See [`ensure_dir`].
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Read a text file.
///
/// # Errors
///
/// Returns an error with the path as context if the file cannot be read.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Read a text file as lines, without their `\n` or `\r\n` terminators.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// failing the read.
///
/// # Errors
///
/// Returns an error with the path as context if the file cannot be read.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, Cow::Owned(_)) {
        warn!("Replaced invalid UTF-8 in {}", path.display());
    }
    Ok(text.lines().map(str::to_string).collect())
}

/// Atomically write bytes using a temporary file in the target directory.
///
/// Readers see either the old content or the new content, never a partial
/// write. Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written, synced
/// or renamed over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    temp.as_file().sync_all().context("Failed to sync file to disk")?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// SHA-256 of a file's content, formatted as `sha256:<hex>`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let content = fs::read(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&content);

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Read and deserialize a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from: {}", path.display()))
}

/// Serialize and atomically write a JSON file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<()>
where
    T: Serialize,
{
    let content = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };

    atomic_write(path, content.as_bytes())
        .with_context(|| format!("Failed to write JSON to: {}", path.display()))
}
