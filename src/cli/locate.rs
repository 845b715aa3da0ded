//! Show which template files a pattern resolves to.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::GeneratorConfig;
use crate::pattern::TemplateLocator;

/// Command to run the template locator without generating anything.
#[derive(Args, Debug)]
pub struct LocateCommand {
    /// Template names or glob patterns
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<String>,

    /// Resolve the patterns as `includeAll` does: every match, one per basename, sorted
    #[arg(short, long)]
    pub all: bool,

    /// Print the search directories before the results
    #[arg(long)]
    pub show_dirs: bool,
}

impl LocateCommand {
    /// Print the located templates, one per line.
    ///
    /// # Errors
    ///
    /// Without `--all`, returns an error for the first pattern with no match.
    /// With `--all`, returns an error only for an invalid glob.
    pub fn execute_with_config(self, config: &GeneratorConfig) -> Result<()> {
        let locator = TemplateLocator::from_properties(config);

        if self.show_dirs {
            for dir in locator.search_directories() {
                println!("{} {}", "search:".dimmed(), dir.display());
            }
        }

        if self.all {
            let found = locator.locate_many(&self.patterns)?;
            if found.is_empty() {
                eprintln!("{}", "No templates matched".yellow());
            }
            for path in found {
                println!("{}", path.display());
            }
        } else {
            for pattern in &self.patterns {
                println!("{}", locator.locate_one(pattern)?.display());
            }
        }

        Ok(())
    }
}
