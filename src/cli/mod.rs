//! Command-line interface for tmplgen.
//!
//! # Available Commands
//!
//! - `generate` - Expand a template into a configuration file
//! - `locate` - Show which template files a pattern resolves to
//! - `check` - List generated files that were edited after generation
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//! - `--config` - Use an alternate configuration file
//!
//! # Example
//!
//! ```bash
//! tmplgen generate server.properties \
//!     --values values.yaml \
//!     --output /etc/app/server.properties \
//!     --property port=5433 \
//!     --property 'jvm.opts+= -Xmx2g' \
//!     --property 'db:url~=/localhost/db.internal/'
//!
//! tmplgen locate 'conf.d/*.conf' --all
//! tmplgen check
//! ```

mod check;
mod generate;
mod locate;

pub use check::CheckCommand;
pub use generate::GenerateCommand;
pub use locate::LocateCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GeneratorConfig;

/// Settings derived from global flags, kept apart from parsing so tests can
/// inject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter applied when `RUST_LOG` is unset; `None` keeps the default (`warn`)
    pub log_level: Option<String>,

    /// Configuration file to load instead of `~/.tmplgen/config.toml`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Calling this
    /// more than once is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("warn"))
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Generate configuration files from line templates.
#[derive(Parser)]
#[command(
    name = "tmplgen",
    about = "Generate configuration files from line templates",
    version,
    long_about = "tmplgen expands @{...} placeholders in template files, applies --property overrides and writes the result with a generation header."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output.
    ///
    /// Logs template search directories, override registration and include
    /// resolution. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.tmplgen/config.toml`. A missing file means an empty
    /// configuration.
    ///
    /// ```bash
    /// tmplgen --config ./deploy/tmplgen.toml generate app.conf
    /// ```
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Expand a template into a configuration file
    Generate(GenerateCommand),

    /// Show the template files a pattern resolves to
    Locate(LocateCommand),

    /// List generated files that changed since they were generated
    Check(CheckCommand),
}

impl Cli {
    /// Execute the parsed command line.
    ///
    /// # Errors
    ///
    /// Returns the error of the failed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command fails.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let generator_config = GeneratorConfig::load_with_optional(config.config_path).await?;

        match self.command {
            Commands::Generate(cmd) => cmd.execute_with_config(generator_config).await,
            Commands::Locate(cmd) => cmd.execute_with_config(&generator_config),
            Commands::Check(cmd) => cmd.execute_with_config(&generator_config),
        }
    }
}
