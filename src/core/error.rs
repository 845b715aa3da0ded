//! Error handling for tmplgen
//!
//! This module provides the error taxonomy for template generation and the
//! user-facing error reporting used by the CLI. It follows two principles:
//! 1. **Strongly-typed errors** ([`TemplateError`]) so callers can tell an
//!    override problem from a missing template
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and suggestions
//!
//! # Error Propagation
//!
//! Library functions return [`anyhow::Result`]. Typed failures are raised as
//! [`TemplateError`] values and can be recovered with
//! [`anyhow::Error::downcast_ref`]. I/O failures are wrapped with context naming
//! the path, but the underlying [`std::io::Error`] stays reachable by downcast.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tmplgen_cli::core::{TemplateError, user_friendly_error};
//!
//! fn locate() -> anyhow::Result<()> {
//!     Err(TemplateError::TemplateNotFound {
//!         pattern: "server.properties".to_string(),
//!         searched: vec![],
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = locate() {
//!     if let Some(TemplateError::TemplateNotFound { pattern, .. }) = e.downcast_ref() {
//!         eprintln!("missing {pattern}");
//!     }
//!     user_friendly_error(e).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which override table a registration targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    /// `key=value`: the whole assignment is replaced
    Replace,
    /// `key+=value`: the value is appended to the resolved assignment
    Append,
    /// `key~=/search/replacement/`: a regex substitution on the resolved value
    Substitute,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Replace => "replacement",
            Self::Append => "addition",
            Self::Substitute => "match",
        };
        f.write_str(name)
    }
}

/// The error type for template generation.
///
/// All variants are fatal for the generation task that raised them. Two
/// situations are deliberately *not* errors: a scoped override whose scope does
/// not match the output target, and an include-all lookup that matches no file.
#[derive(Error, Debug, Clone)]
pub enum TemplateError {
    /// An override registration was attempted without a value.
    #[error("Unable to add a fixed {kind} for '{key}' using an empty value")]
    InvalidOverrideValue {
        /// The assignment key being overridden
        key: String,
        /// The table the registration targeted
        kind: OverrideKind,
    },

    /// A `--property` specification could not be parsed.
    #[error("Invalid --property value '{spec}': {reason}")]
    MalformedOverrideSpecification {
        /// The raw specification string
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// A substitute override carried a search pattern that is not a valid regex.
    #[error("Invalid search pattern '{pattern}' for '{key}': {reason}")]
    InvalidOverridePattern {
        /// The assignment key being overridden
        key: String,
        /// The offending regular expression
        pattern: String,
        /// The regex compiler message
        reason: String,
    },

    /// No directory in the search path contains a file for the pattern.
    #[error("Unable to find a template file for '{pattern}'")]
    TemplateNotFound {
        /// The requested pattern
        pattern: String,
        /// The directories that were searched, in order
        searched: Vec<PathBuf>,
    },

    /// A template includes itself directly or transitively.
    #[error("Template include cycle detected: {}", format_chain(.chain))]
    TemplateCycle {
        /// The include stack, ending with the template that closed the cycle
        chain: Vec<PathBuf>,
    },

    /// A glob pattern handed to the locator is not valid glob syntax.
    #[error("Invalid template search pattern '{pattern}': {reason}")]
    InvalidSearchPattern {
        /// The offending glob pattern
        pattern: String,
        /// The glob parser message
        reason: String,
    },

    /// Catch-all for errors that do not fit another variant
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> ")
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
///
/// ```rust,no_run
/// use tmplgen_cli::core::{ErrorContext, TemplateError};
///
/// let context = ErrorContext::new(TemplateError::Other { message: "boom".into() })
///     .with_suggestion("Run with --verbose for more information");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TemplateError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: TemplateError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognises [`TemplateError`] variants and [`std::io::Error`] kinds anywhere in
/// the error chain; everything else is reported with its full context chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        return create_error_context(template_error.clone());
    }

    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            let message = format!("{error:#}");
            return match io_error.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    ErrorContext::new(TemplateError::Other {
                        message,
                    })
                    .with_suggestion("Check file permissions on the output path and template directories")
                }
                std::io::ErrorKind::NotFound => ErrorContext::new(TemplateError::Other {
                    message,
                })
                .with_suggestion("Check that the path exists and is spelled correctly"),
                _ => ErrorContext::new(TemplateError::Other {
                    message,
                }),
            };
        }
    }

    ErrorContext::new(TemplateError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: TemplateError) -> ErrorContext {
    match &error {
        TemplateError::MalformedOverrideSpecification {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Use [scope:]key=value, [scope:]key+=value or [scope:]key~=/search/replacement/",
        ),
        TemplateError::InvalidOverridePattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("The search part of a ~= override is a regular expression; escape special characters"),
        TemplateError::TemplateNotFound {
            searched,
            ..
        } => {
            let details = if searched.is_empty() {
                "No template search directories are configured".to_string()
            } else {
                format!("Searched: {}", format_chain(searched).replace(" -> ", ", "))
            };
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Add the directory holding the template to template_search_path")
        }
        TemplateError::TemplateCycle {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Remove the include that points back to a template already being expanded"),
        _ => ErrorContext::new(error),
    }
}
