//! Line resolution pipeline.
//!
//! Every template line goes through the same four stages, in this order:
//!
//! 1. **Replace** - an assignment whose key has a replace override becomes
//!    `key=<override>` and resolution stops. Placeholders in the original
//!    value are never evaluated.
//! 2. **Expand** - every placeholder token is replaced with its resolved text.
//!    Includes recurse into [`LineResolver::resolve_file`], which runs this
//!    whole pipeline on each line of the included template.
//! 3. **Append** - if the expanded line is an assignment with an append
//!    override, the override text is concatenated onto the value.
//! 4. **Substitute** - if the key also has a substitute override, the first
//!    regex match in the (appended) value is replaced.
//!
//! Each stage consumes the previous stage's type ([`RawLine`] →
//! [`ExpandedLine`] → [`AppendedLine`] → `String`), so the stages cannot be
//! reordered or skipped.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::core::TemplateError;
use crate::overrides::OverrideRegistry;
use crate::pattern::TemplateLocator;
use crate::templating::assignment::{Assignment, split_assignment};
use crate::templating::token::{Marker, Placeholder, Segment, tokenize};
use crate::utils::fs::read_lines;
use crate::values::ValueResolver;

/// A line before any stage has run.
#[derive(Debug)]
pub struct RawLine<'a>(&'a str);

/// Outcome of the replace stage.
#[derive(Debug)]
pub enum ReplaceOutcome<'a> {
    /// A replace override matched; this is the final line.
    Replaced(String),
    /// No replace override; continue with expansion.
    Pending(RawLine<'a>),
}

/// A line after placeholder expansion.
#[derive(Debug)]
pub struct ExpandedLine(String);

/// A line after the append stage, carrying its parsed assignment.
#[derive(Debug)]
pub struct AppendedLine {
    line: String,
    assignment: Option<(String, String)>,
}

impl<'a> RawLine<'a> {
    /// Wrap a template line.
    #[must_use]
    pub const fn new(line: &'a str) -> Self {
        Self(line)
    }

    /// Stage 1: apply a replace override.
    #[must_use]
    pub fn replace(self, overrides: &OverrideRegistry) -> ReplaceOutcome<'a> {
        if let Some(assignment) = split_assignment(self.0)
            && let Some(value) = overrides.replacement(assignment.key)
        {
            trace!("Replacing '{}' from override", assignment.key);
            return ReplaceOutcome::Replaced(Assignment::render(assignment.key, value));
        }
        ReplaceOutcome::Pending(self)
    }
}

impl ExpandedLine {
    /// Stage 3: append the override text to the assignment value.
    #[must_use]
    pub fn append(self, overrides: &OverrideRegistry) -> AppendedLine {
        let Some(assignment) = split_assignment(&self.0) else {
            return AppendedLine {
                line: self.0,
                assignment: None,
            };
        };

        let key = assignment.key.to_string();
        let mut value = assignment.value.to_string();

        if let Some(addition) = overrides.addition(&key) {
            trace!("Appending to '{}' from override", key);
            value.push_str(addition);
            return AppendedLine {
                line: Assignment::render(&key, &value),
                assignment: Some((key, value)),
            };
        }

        AppendedLine {
            line: self.0,
            assignment: Some((key, value)),
        }
    }
}

impl AppendedLine {
    /// Stage 4: apply the substitute override to the assignment value.
    #[must_use]
    pub fn substitute(self, overrides: &OverrideRegistry) -> String {
        match &self.assignment {
            Some((key, value)) => match overrides.substitution(key) {
                Some(substitution) => {
                    trace!("Substituting in '{}' from override", key);
                    Assignment::render(key, &substitution.apply(value))
                }
                None => self.line,
            },
            None => self.line,
        }
    }
}

fn template_identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Resolves lines and whole template files against overrides and values.
///
/// The resolver tracks the stack of templates being included so a template
/// that includes itself, directly or through others, fails with
/// [`TemplateError::TemplateCycle`] instead of recursing forever.
pub struct LineResolver<'a> {
    overrides: &'a OverrideRegistry,
    locator: &'a TemplateLocator,
    values: &'a dyn ValueResolver,
    include_stack: Vec<PathBuf>,
}

impl<'a> LineResolver<'a> {
    /// Create a resolver borrowing the engine's collaborators.
    #[must_use]
    pub fn new(
        overrides: &'a OverrideRegistry,
        locator: &'a TemplateLocator,
        values: &'a dyn ValueResolver,
    ) -> Self {
        Self {
            overrides,
            locator,
            values,
            include_stack: Vec::new(),
        }
    }

    /// Treat `template` as already being resolved, so lines taken from it
    /// cannot include it again.
    #[must_use]
    pub fn within(mut self, template: &Path) -> Self {
        self.include_stack.push(template_identity(template));
        self
    }

    /// Run the full pipeline on one line.
    ///
    /// # Errors
    ///
    /// Fails when an include cannot be located, read, or closes a cycle.
    pub fn resolve(&mut self, line: &str) -> Result<String> {
        match RawLine::new(line).replace(self.overrides) {
            ReplaceOutcome::Replaced(line) => Ok(line),
            ReplaceOutcome::Pending(raw) => {
                let expanded = self.expand(raw)?;
                Ok(expanded.append(self.overrides).substitute(self.overrides))
            }
        }
    }

    /// Resolve every line of a template file and join them with `\n`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::TemplateCycle`] if `path` is already being
    /// resolved further up the include chain, and propagates read and
    /// resolution errors.
    pub fn resolve_file(&mut self, path: &Path) -> Result<String> {
        let identity = template_identity(path);

        if self.include_stack.contains(&identity) {
            let mut chain = self.include_stack.clone();
            chain.push(identity);
            return Err(TemplateError::TemplateCycle {
                chain,
            }
            .into());
        }

        debug!("Resolving template {}", path.display());
        self.include_stack.push(identity);
        let result = self.resolve_lines(path);
        self.include_stack.pop();

        result
    }

    fn resolve_lines(&mut self, path: &Path) -> Result<String> {
        let mut out = Vec::new();
        for line in read_lines(path)? {
            out.push(self.resolve(&line)?);
        }
        Ok(out.join("\n"))
    }

    /// Stage 2: replace every placeholder with its resolved text.
    fn expand(&mut self, raw: RawLine<'_>) -> Result<ExpandedLine> {
        let mut line = String::with_capacity(raw.0.len());

        for segment in tokenize(raw.0) {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let text = self.expand_placeholder(&placeholder)?;
                    line.push_str(&text);
                }
            }
        }

        Ok(ExpandedLine(line))
    }

    fn expand_placeholder(&mut self, placeholder: &Placeholder) -> Result<String> {
        let value = self.values.resolve(&placeholder.path());

        match placeholder.marker {
            Some(Marker::Include) => {
                let path = self.locator.locate_one(&value.to_text())?;
                self.resolve_file(&path)
            }
            Some(Marker::IncludeAll) => {
                let templates = self.locator.locate_many(&value.to_list())?;
                let mut parts = Vec::with_capacity(templates.len());
                for template in &templates {
                    parts.push(self.resolve_file(template)?);
                }
                Ok(parts.join("\n\n"))
            }
            marker => {
                let mut text = value.to_text();

                if text.is_empty()
                    && let Some(default) = &placeholder.default
                {
                    text.clone_from(default);
                }

                if marker == Some(Marker::Comment) {
                    text = if text.is_empty() { "#".to_string() } else { String::new() };
                }

                Ok(text)
            }
        }
    }
}
