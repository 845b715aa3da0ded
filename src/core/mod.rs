//! Core types for tmplgen
//!
//! Holds the error taxonomy shared by every other module and the helpers that
//! turn errors into user-facing CLI output.
//!
//! - [`TemplateError`] - Enumerated failure modes of template generation
//! - [`ErrorContext`] - Error wrapper with details and suggestions
//! - [`user_friendly_error`] - Convert any [`anyhow::Error`] into an [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, OverrideKind, TemplateError, user_friendly_error};
