//! List generated files that were edited after generation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use crate::config::GeneratorConfig;
use crate::watch::WatchRegistry;

/// Command to compare registered files against their recorded checksums.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Exit with an error when any file was modified
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    /// Print every modified or deleted file.
    ///
    /// # Errors
    ///
    /// Returns an error when no watch registry is configured, when the
    /// registry cannot be read, or in `--strict` mode when drift is found.
    pub fn execute_with_config(self, config: &GeneratorConfig) -> Result<()> {
        let Some(path) = &config.watch_registry else {
            bail!("No watch registry is configured; set `watch_registry` in the config file");
        };

        let modified = WatchRegistry::new(path).modified_files()?;
        if modified.is_empty() {
            println!("{}", "All generated files are unchanged".green());
            return Ok(());
        }

        for file in &modified {
            println!("{} {}", "modified:".yellow(), file.display());
        }

        if self.strict {
            bail!("{} generated file(s) were modified", modified.len());
        }
        Ok(())
    }
}
