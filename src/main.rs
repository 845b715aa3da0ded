//! tmplgen CLI entry point
//!
//! Parses the command line, sets up logging, runs the command and turns any
//! error into a user-friendly message with a non-zero exit code.
//!
//! - `generate` - Expand a template into a configuration file
//! - `locate` - Show which template files a pattern resolves to
//! - `check` - List generated files edited since generation

use anyhow::Result;
use clap::Parser;
use tmplgen_cli::cli;
use tmplgen_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    let config = cli.build_config();
    config.init_logging();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute_with_config(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
