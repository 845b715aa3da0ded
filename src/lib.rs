//! tmplgen - configuration file generator
//!
//! Generates configuration files from line-oriented template skeletons. Each
//! template line may carry `@{...}` placeholder tokens that are resolved
//! through a value lookup, and `key=value` lines can be overridden from the
//! command line without editing the template.
//!
//! # Architecture Overview
//!
//! A generation run flows through four parts:
//! - the **override registry** holds replace, append and substitute overrides
//!   parsed from `[scope:]key[+|~]=value` specifications
//! - the **line resolver** runs each line through replace, placeholder
//!   expansion, append and substitute, recursing into included templates
//! - the **template locator** finds templates across the configured search
//!   directories, de-duplicating include-all matches by file name
//! - the **output writer** writes the result with an optional
//!   `# AUTO-GENERATED` header and file mode, then registers the file for
//!   drift detection
//!
//! # Core Modules
//!
//! ## Engine
//! - [`templating`] - Token grammar, assignment recognition, line resolution and the [`templating::Transformer`]
//! - [`overrides`] - Override specifications and the override registry
//! - [`pattern`] - Template search path and glob-based lookup
//! - [`output`] - Document model and file writing
//!
//! ## Collaborators
//! - [`config`] - Property sources and the TOML configuration file
//! - [`values`] - Placeholder value resolution from JSON, TOML or YAML documents
//! - [`watch`] - Registration of generated files and drift detection
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and user-facing error formatting
//! - [`utils`] - Filesystem helpers
//!
//! # Template Example
//!
//! ```text
//! # server.properties
//! host=@{server.host|0.0.0.0}
//! port=@{server.port|8080}
//! @{#(server.tls)}tls.keystore=@{server.keystore}
//! @{includeAll(server.extra)}
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Print the resolved template
//! tmplgen generate server.properties --values values.yaml
//!
//! # Write it with overrides and a restricted mode
//! tmplgen generate server.properties --values values.yaml \
//!     --output /etc/app/server.properties --mode 0640 \
//!     --property port=9090 --property 'host~=/0.0.0.0/127.0.0.1/'
//!
//! # Find generated files edited by hand
//! tmplgen check
//! ```

// Engine
pub mod output;
pub mod overrides;
pub mod pattern;
pub mod templating;

// Collaborators
pub mod config;
pub mod values;
pub mod watch;

// Supporting modules
pub mod cli;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
