//! Expand a template into a configuration file.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::output::Emitted;
use crate::templating::Transformer;
use crate::values::ValueTree;
use crate::watch::WatchRegistry;

/// Command to generate one file from a template.
///
/// Without `--output` the resolved text is printed to stdout and nothing is
/// written or registered.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Template file name, looked up in the template search path
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// File to write
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Override specification: `[scope:]key=value`, `key+=text` or `key~=/re/rep/`
    ///
    /// May be repeated. Scoped overrides apply only when the output path
    /// contains the scope.
    #[arg(short, long = "property", value_name = "SPEC")]
    pub properties: Vec<String>,

    /// Values document (JSON, TOML or YAML) that placeholders resolve against
    #[arg(long, value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// Do not write the `# AUTO-GENERATED` header
    #[arg(long)]
    pub no_timestamp: bool,

    /// Do not register the written file in the watch registry
    #[arg(long)]
    pub no_watch: bool,

    /// Octal file mode for the written file, e.g. `0640`
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    pub mode: Option<u32>,
}

/// Parse an octal permission string such as `640`, `0640` or `0o640`.
pub(crate) fn parse_mode(value: &str) -> Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("'{value}' is not an octal file mode"))?;

    if mode > 0o7777 {
        return Err(format!("'{value}' is out of range for a file mode"));
    }
    Ok(mode)
}

impl GenerateCommand {
    /// Generate the file using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the values file cannot be loaded, an override is
    /// malformed, the template cannot be found or resolved, or the output
    /// cannot be written.
    pub async fn execute_with_config(self, config: GeneratorConfig) -> Result<()> {
        let registry = config.watch_registry.clone().map(WatchRegistry::new);

        let mut engine = Transformer::new(config, self.output.clone());
        if let Some(registry) = registry {
            engine = engine.with_watcher(registry);
        }
        if let Some(values) = &self.values {
            debug!("Loading values from {}", values.display());
            engine.set_value_resolver(ValueTree::from_file(values)?);
        }

        engine.set_fixed_properties(&self.properties)?;
        engine.set_timestamp(!self.no_timestamp);
        engine.set_watch_file(!self.no_watch);
        engine.set_mode(self.mode);
        engine.load_template(&self.template)?;

        match engine.output()? {
            Emitted::Text(text) => println!("{text}"),
            Emitted::Written(path) => {
                eprintln!("{} {}", "Generated".green().bold(), path.display());
            }
        }

        Ok(())
    }
}
