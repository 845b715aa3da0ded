//! Value resolution for placeholder tokens.
//!
//! A placeholder such as `@{db.port}` asks the [`ValueResolver`] for the
//! dotted path `["db", "port"]`. The resolver answers with a
//! [`ResolvedValue`]: nothing, a single string, or a list of strings.
//!
//! How values are found is up to the embedder. Closures implement the trait
//! directly, and [`ValueTree`] resolves paths against a TOML, YAML or JSON
//! document for the CLI.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// The raw result of resolving a placeholder path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolvedValue {
    /// Nothing is known for the path
    #[default]
    Empty,
    /// A single value
    Text(String),
    /// Several values, joined with `,` for plain substitution
    List(Vec<String>),
}

impl ResolvedValue {
    /// Text form used for substitution: lists are joined with `,`.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(","),
        }
    }

    /// Pattern list form used by include-all: text becomes a one-element list.
    #[must_use]
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::Text(text) if text.is_empty() => Vec::new(),
            Self::Text(text) => vec![text.clone()],
            Self::List(items) => items.clone(),
        }
    }
}

impl From<&str> for ResolvedValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ResolvedValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for ResolvedValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<ResolvedValue>> From<Option<T>> for ResolvedValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Maps a dotted key path to a value.
pub trait ValueResolver {
    /// Resolve `path` (the placeholder name split on `.`).
    fn resolve(&self, path: &[&str]) -> ResolvedValue;
}

impl<F> ValueResolver for F
where
    F: Fn(&[&str]) -> ResolvedValue,
{
    fn resolve(&self, path: &[&str]) -> ResolvedValue {
        self(path)
    }
}

/// A resolver that knows nothing; every placeholder resolves empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValues;

impl ValueResolver for NoValues {
    fn resolve(&self, _path: &[&str]) -> ResolvedValue {
        ResolvedValue::Empty
    }
}

/// Resolves dotted paths against a structured document.
///
/// Objects are walked by key, arrays by numeric index. The leaf is mapped
/// as follows:
///
/// - `null` or a missing path: [`ResolvedValue::Empty`]
/// - strings, numbers, booleans: [`ResolvedValue::Text`]
/// - arrays: [`ResolvedValue::List`] of the elements' text forms
/// - objects: [`ResolvedValue::Text`] holding compact JSON
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTree {
    root: Value,
}

impl ValueTree {
    /// Wrap an existing JSON value.
    #[must_use]
    pub const fn new(root: Value) -> Self {
        Self {
            root,
        }
    }

    /// Load a values document, choosing the format from the file extension.
    ///
    /// `.toml` is parsed as TOML, `.yaml`/`.yml` as YAML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read values file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let root = match extension {
            "toml" => {
                let value: toml::Value = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse TOML values: {}", path.display()))?;
                serde_json::to_value(value)
                    .with_context(|| format!("Failed to convert TOML values: {}", path.display()))?
            }
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML values: {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON values: {}", path.display()))?,
        };

        Ok(Self::new(root))
    }

    fn lookup(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.root, |node, segment| match node {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ValueResolver for ValueTree {
    fn resolve(&self, path: &[&str]) -> ResolvedValue {
        match self.lookup(path) {
            None | Some(Value::Null) => ResolvedValue::Empty,
            Some(Value::Array(items)) => ResolvedValue::List(items.iter().map(scalar_text).collect()),
            Some(value) => ResolvedValue::Text(scalar_text(value)),
        }
    }
}
