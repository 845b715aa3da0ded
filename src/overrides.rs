//! Caller-supplied overrides for template assignments.
//!
//! Overrides let the operator change a generated `key=value` line without
//! touching the template. They arrive as `--property` strings:
//!
//! | Specification               | Table        | Effect on `key=...` lines                    |
//! |-----------------------------|--------------|----------------------------------------------|
//! | `key=value`                 | replace      | line becomes `key=value`, nothing else runs  |
//! | `key+=value`                | append       | `value` is appended to the resolved value    |
//! | `key~=/search/replacement/` | substitute   | first regex match in the value is replaced   |
//!
//! Any specification may be prefixed with `scope:`. A scoped specification is
//! only kept when the output path of the current generation contains `scope`;
//! otherwise it is dropped without error. Registering the value `{default}`
//! removes an existing entry instead of storing it.
//!
//! The three tables are independent: one key may appear in all of them. How
//! they combine on a line is decided by the resolver pipeline in
//! [`crate::templating::resolver`].

use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::core::{OverrideKind, TemplateError};

/// Registering this value removes the override for the key.
pub const DEFAULT_VALUE: &str = "{default}";

/// A compiled `~=` override: one regex substitution on the assignment value.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    /// Compile a substitution for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidOverridePattern`] if `pattern` is not a
    /// valid regular expression.
    pub fn new(key: &str, pattern: &str, replacement: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|e| TemplateError::InvalidOverridePattern {
            key: key.to_string(),
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: compiled,
            replacement: replacement.to_string(),
        })
    }

    /// Parse the `/search/replacement/` form.
    ///
    /// The value must start with `/`. Trailing empty fields are ignored, so the
    /// closing `/` is optional, and exactly two fields must remain.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MalformedOverrideSpecification`] for any other
    /// shape and [`TemplateError::InvalidOverridePattern`] for a bad regex.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let mut fields: Vec<&str> = value.split('/').collect();
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }

        match fields.as_slice() {
            ["", search, replacement] => Self::new(key, search, replacement),
            _ => Err(TemplateError::MalformedOverrideSpecification {
                spec: format!("{key}~={value}"),
                reason: "Matches must be in the form of /search/replacement/".to_string(),
            }
            .into()),
        }
    }

    /// Replace the first match of the pattern in `value`.
    ///
    /// `$1` and `${name}` in the replacement refer to capture groups.
    #[must_use]
    pub fn apply(&self, value: &str) -> String {
        self.pattern.replace(value, self.replacement.as_str()).into_owned()
    }

    /// The search expression.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// A parsed `--property` specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSpec {
    /// Output-path substring the override is restricted to
    pub scope: Option<String>,
    /// Assignment key, without scope or modifier
    pub key: String,
    /// Target table, chosen by the `+`/`~` modifier
    pub kind: OverrideKind,
    /// Everything after the first `=`
    pub value: String,
}

impl OverrideSpec {
    /// Whether this specification should be registered for `output_target`.
    ///
    /// Unscoped specifications always apply. Scoped ones need an output target
    /// whose path contains the scope.
    #[must_use]
    pub fn applies_to(&self, output_target: Option<&str>) -> bool {
        match &self.scope {
            None => true,
            Some(scope) => output_target.is_some_and(|target| target.contains(scope.as_str())),
        }
    }
}

impl FromStr for OverrideSpec {
    type Err = anyhow::Error;

    fn from_str(spec: &str) -> Result<Self> {
        let malformed = |reason: &str| TemplateError::MalformedOverrideSpecification {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let Some((lhs, value)) = spec.split_once('=') else {
            return Err(malformed(
                "There should be a key/value pair joined by a single =",
            )
            .into());
        };

        let parts: Vec<&str> = lhs.split(':').collect();
        let (scope, key) = match parts.as_slice() {
            [key] => (None, *key),
            [scope, key] => (Some((*scope).to_string()), *key),
            _ => {
                return Err(malformed("There may only be a single ':' in the search key").into());
            }
        };

        let (key, kind) = if let Some(key) = key.strip_suffix('+') {
            (key, OverrideKind::Append)
        } else if let Some(key) = key.strip_suffix('~') {
            (key, OverrideKind::Substitute)
        } else {
            (key, OverrideKind::Replace)
        };

        if key.is_empty() {
            return Err(malformed("The search key is empty").into());
        }

        Ok(Self {
            scope,
            key: key.to_string(),
            kind,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for OverrideSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope}:")?;
        }
        let modifier = match self.kind {
            OverrideKind::Replace => "",
            OverrideKind::Append => "+",
            OverrideKind::Substitute => "~",
        };
        write!(f, "{}{}={}", self.key, modifier, self.value)
    }
}

/// The three override tables.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    replacements: HashMap<String, String>,
    additions: HashMap<String, String>,
    matches: HashMap<String, Substitution>,
}

fn require_value<'a>(key: &str, value: Option<&'a str>, kind: OverrideKind) -> Result<&'a str> {
    value.ok_or_else(|| {
        TemplateError::InvalidOverrideValue {
            key: key.to_string(),
            kind,
        }
        .into()
    })
}

impl OverrideRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the replace override for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidOverrideValue`] when `value` is `None`.
    pub fn register_replace(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let value = require_value(key, value, OverrideKind::Replace)?;
        if value == DEFAULT_VALUE {
            self.replacements.remove(key);
        } else {
            self.replacements.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    /// Set or clear the append override for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidOverrideValue`] when `value` is `None`.
    pub fn register_addition(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let value = require_value(key, value, OverrideKind::Append)?;
        if value == DEFAULT_VALUE {
            self.additions.remove(key);
        } else {
            self.additions.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    /// Set or clear the substitute override for `key` from a `/search/replacement/` value.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidOverrideValue`] when `value` is `None`,
    /// and the errors of [`Substitution::parse`] for a malformed value.
    pub fn register_match(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let value = require_value(key, value, OverrideKind::Substitute)?;
        if value == DEFAULT_VALUE {
            self.matches.remove(key);
        } else {
            let substitution = Substitution::parse(key, value)?;
            self.matches.insert(key.to_string(), substitution);
        }
        Ok(())
    }

    /// Register a parsed specification in the table its modifier selects.
    ///
    /// # Errors
    ///
    /// Propagates the errors of the `register_*` methods.
    pub fn register(&mut self, spec: &OverrideSpec) -> Result<()> {
        let value = Some(spec.value.as_str());
        match spec.kind {
            OverrideKind::Replace => self.register_replace(&spec.key, value),
            OverrideKind::Append => self.register_addition(&spec.key, value),
            OverrideKind::Substitute => self.register_match(&spec.key, value),
        }
    }

    /// Parse and register a list of raw `--property` specifications.
    ///
    /// Specifications scoped to a different output target are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MalformedOverrideSpecification`] on the first
    /// unparseable specification; entries registered before it are kept.
    pub fn parse_specifications<S: AsRef<str>>(
        &mut self,
        specs: &[S],
        output_target: Option<&str>,
    ) -> Result<()> {
        for raw in specs {
            let spec: OverrideSpec = raw.as_ref().parse()?;

            if !spec.applies_to(output_target) {
                trace!("Skipping override '{}' scoped to another target", spec);
                continue;
            }

            debug!("Registering {} override for '{}'", spec.kind, spec.key);
            self.register(&spec)?;
        }
        Ok(())
    }

    /// Remove every override.
    pub fn clear(&mut self) {
        self.replacements.clear();
        self.additions.clear();
        self.matches.clear();
    }

    /// The replace override for `key`, if any.
    #[must_use]
    pub fn replacement(&self, key: &str) -> Option<&str> {
        self.replacements.get(key).map(String::as_str)
    }

    /// The append override for `key`, if any.
    #[must_use]
    pub fn addition(&self, key: &str) -> Option<&str> {
        self.additions.get(key).map(String::as_str)
    }

    /// The substitute override for `key`, if any.
    #[must_use]
    pub fn substitution(&self, key: &str) -> Option<&Substitution> {
        self.matches.get(key)
    }

    /// True when no table holds an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.additions.is_empty() && self.matches.is_empty()
    }
}
