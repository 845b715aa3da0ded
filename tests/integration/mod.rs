//! Integration test suite for tmplgen
//!
//! End-to-end tests driving the library API and the `tmplgen` binary against
//! temporary template trees.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **overrides**: override specifications and their effect on generated lines
//! - **resolution**: placeholders, defaults, conditional comments and includes
//! - **locator**: single and multi-template lookup across search directories
//! - **output**: emitted text, written files, headers and modes
//! - **watch**: drift detection of generated files
//! - **cli**: the `tmplgen` binary

mod cli;
mod locator;
mod overrides;
mod resolution;
mod watch;
