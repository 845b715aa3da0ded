//! Template expansion engine.
//!
//! A [`Transformer`] turns a template skeleton into a generated file. It is
//! built once per generation task from a [`PropertySource`] (which supplies
//! the template search path) and an optional output target, and then used in
//! this order:
//!
//! 1. register `--property`-style overrides with
//!    [`Transformer::set_fixed_properties`]
//! 2. load a template with [`Transformer::load_template`] or push lines with
//!    [`Transformer::push_line`]
//! 3. call [`Transformer::output`], which resolves every line and writes the
//!    file, or returns the text when no output target was given
//!
//! # Template syntax
//!
//! | Token | Result |
//! |-------|--------|
//! | `@{db.host}` | the value at path `db.host` (lists are joined with `,`) |
//! | `@{db.host\|localhost}` | the value, or `localhost` when it is empty |
//! | `@{#(feature)}` | `#` when the value is empty, nothing otherwise |
//! | `@{include(main)}` | the resolved content of the template named by the value |
//! | `@{includeAll(parts)}` | every template matching the value's glob patterns, resolved and separated by blank lines |
//!
//! # Overrides
//!
//! | Specification | Effect on `key=...` lines |
//! |---------------|---------------------------|
//! | `key=value` | the line becomes `key=value`; placeholders on it are never evaluated |
//! | `key+=text` | `text` is appended to the expanded value |
//! | `key~=/re/rep/` | the first match of `re` in the expanded value is replaced |
//! | `scope:key=value` | as above, only when the output path contains `scope` |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use tmplgen_cli::config::TEMPLATE_SEARCH_PATH;
//! use tmplgen_cli::output::Emitted;
//! use tmplgen_cli::templating::Transformer;
//! use tmplgen_cli::values::ResolvedValue;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut config = HashMap::new();
//! config.insert(TEMPLATE_SEARCH_PATH.to_string(), "/etc/app/templates".to_string());
//!
//! let mut engine = Transformer::new(config, None).with_values(|path: &[&str]| match path {
//!     ["db", "host"] => ResolvedValue::from("db1"),
//!     _ => ResolvedValue::Empty,
//! });
//! engine.set_fixed_properties(&["port=5433"])?;
//! engine.load_template("server.properties")?;
//!
//! if let Emitted::Text(text) = engine.output()? {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod resolver;
pub mod token;

pub use assignment::{Assignment, split_assignment};
pub use resolver::LineResolver;
pub use token::{Marker, Placeholder, Segment, tokenize};

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::PropertySource;
use crate::output::{Document, Emitted, OutputOptions, write_document};
use crate::overrides::OverrideRegistry;
use crate::pattern::TemplateLocator;
use crate::utils::fs::read_lines;
use crate::values::{NoValues, ValueResolver};
use crate::watch::{FileWatcher, NoopWatcher};

/// The expansion engine for one generation task.
pub struct Transformer {
    config: Box<dyn PropertySource>,
    output_path: Option<PathBuf>,
    values: Box<dyn ValueResolver>,
    watcher: Box<dyn FileWatcher>,
    locator: TemplateLocator,
    overrides: OverrideRegistry,
    document: Document,
    template: Option<PathBuf>,
    options: OutputOptions,
}

impl Transformer {
    /// Create an engine reading its search path from `config`.
    ///
    /// Without an `output_path`, [`Transformer::emit`] returns the text
    /// instead of writing a file. Values resolve empty and written files are
    /// not registered until a resolver and watcher are supplied.
    pub fn new(config: impl PropertySource + 'static, output_path: Option<PathBuf>) -> Self {
        let locator = TemplateLocator::from_properties(&config);
        Self {
            config: Box::new(config),
            output_path,
            values: Box::new(NoValues),
            watcher: Box::new(NoopWatcher),
            locator,
            overrides: OverrideRegistry::new(),
            document: Document::default(),
            template: None,
            options: OutputOptions::default(),
        }
    }

    /// Use `values` to resolve placeholders.
    #[must_use]
    pub fn with_values(mut self, values: impl ValueResolver + 'static) -> Self {
        self.set_value_resolver(values);
        self
    }

    /// Replace the placeholder value resolver.
    pub fn set_value_resolver(&mut self, values: impl ValueResolver + 'static) {
        self.values = Box::new(values);
    }

    /// Notify `watcher` of every written file.
    #[must_use]
    pub fn with_watcher(mut self, watcher: impl FileWatcher + 'static) -> Self {
        self.watcher = Box::new(watcher);
        self
    }

    /// Replace all overrides with those parsed from `specs`.
    ///
    /// Scoped specifications are matched against the output path.
    ///
    /// # Errors
    ///
    /// Returns the first parse or registration error.
    pub fn set_fixed_properties<S: AsRef<str>>(&mut self, specs: &[S]) -> Result<()> {
        let target = self.output_path.as_ref().map(|p| p.display().to_string());
        self.overrides.clear();
        self.overrides.parse_specifications(specs, target.as_deref())
    }

    /// Registered overrides.
    #[must_use]
    pub const fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }

    /// Mutable access for registering overrides one by one.
    pub const fn overrides_mut(&mut self) -> &mut OverrideRegistry {
        &mut self.overrides
    }

    /// Toggle the `# AUTO-GENERATED` header.
    pub const fn set_timestamp(&mut self, enabled: bool) {
        self.options.timestamp = enabled;
    }

    /// Whether the header is written.
    #[must_use]
    pub const fn timestamp(&self) -> bool {
        self.options.timestamp
    }

    /// Toggle watch registration of the written file.
    pub const fn set_watch_file(&mut self, enabled: bool) {
        self.options.watch_file = enabled;
    }

    /// Whether the written file is registered with the watcher.
    #[must_use]
    pub const fn watch_file(&self) -> bool {
        self.options.watch_file
    }

    /// Set or clear the POSIX mode of the written file.
    pub const fn set_mode(&mut self, mode: Option<u32>) {
        self.options.mode = mode;
    }

    /// Mode applied to the written file.
    #[must_use]
    pub const fn mode(&self) -> Option<u32> {
        self.options.mode
    }

    /// The output target, if any.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// The template locator built from the configuration.
    #[must_use]
    pub const fn locator(&self) -> &TemplateLocator {
        &self.locator
    }

    /// Resolve a single line without touching the document.
    ///
    /// # Errors
    ///
    /// Fails when an include cannot be located or read, or forms a cycle.
    pub fn resolve_line(&self, line: &str) -> Result<String> {
        self.resolver().resolve(line)
    }

    /// Replace the document with the lines of the template matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::TemplateError::TemplateNotFound`] when no search
    /// directory holds the template, or an error if it cannot be read.
    pub fn load_template(&mut self, pattern: &str) -> Result<()> {
        let path = self.locator.locate_one(pattern)?;
        debug!("Loading template {}", path.display());
        self.document = Document::new(read_lines(&path)?);
        self.template = Some(path);
        Ok(())
    }

    /// Append a raw line to the document.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.document.push(line);
    }

    /// Map every document line through `f`.
    ///
    /// The mapped lines are resolved again on the next render.
    pub fn transform_lines<F>(&mut self, f: F)
    where
        F: FnMut(&str) -> String,
    {
        self.document.map_lines(f);
    }

    /// Resolve every pending document line in order.
    ///
    /// Lines resolved by an earlier render are kept as they are, so only lines
    /// pushed since then are resolved. [`Transformer::transform_lines`] makes
    /// every line pending again.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error; the document is left unresolved.
    pub fn render(&mut self) -> Result<()> {
        if self.document.is_rendered() {
            return Ok(());
        }

        let resolved = {
            let mut resolver = self.resolver();
            let pending = self.document.pending();
            let mut resolved = Vec::with_capacity(pending.len());
            for line in pending {
                resolved.push(resolver.resolve(line)?);
            }
            resolved
        };

        self.document.resolve_pending(resolved);
        Ok(())
    }

    /// Produce the rendered document.
    ///
    /// Without an output target the text is returned and nothing is written.
    /// Otherwise the file is written and, when enabled, registered with the
    /// watcher.
    ///
    /// # Errors
    ///
    /// Propagates rendering, write and watcher errors.
    pub fn emit(&mut self) -> Result<Emitted> {
        self.render()?;

        let Some(path) = &self.output_path else {
            return Ok(Emitted::Text(self.document.to_text()));
        };

        write_document(path, self.document.lines(), &self.options)?;
        if self.options.watch_file {
            self.watcher.watch_file(path, self.config.as_ref())?;
        }
        Ok(Emitted::Written(path.clone()))
    }

    /// Render and emit.
    ///
    /// # Errors
    ///
    /// See [`Transformer::render`] and [`Transformer::emit`].
    pub fn output(&mut self) -> Result<Emitted> {
        self.render()?;
        self.emit()
    }

    /// The document joined with `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.document.to_text()
    }

    /// The document lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        self.document.lines()
    }

    fn resolver(&self) -> LineResolver<'_> {
        let resolver = LineResolver::new(&self.overrides, &self.locator, self.values.as_ref());
        match &self.template {
            Some(template) => resolver.within(template),
            None => resolver,
        }
    }
}
