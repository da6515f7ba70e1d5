//! Option functions and configuration resolution
//!
//! Options are applied strictly in call order onto an [`Options`] value.
//! Framework-level settings (`level`, `fields`, `output`) live directly on
//! [`Options`]; backend-specific settings go into the [`Overrides`] bag,
//! which a host framework can also fill wholesale through
//! [`with_overrides`]. [`resolve`] applies the framework-level settings
//! first and the bag last, so host policy always wins.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::backend::{Backend, Hook, SharedError, SharedWriter};
use crate::config::{Configuration, ExitFn, Mode};
use crate::level::Level;

/// A single option function
pub struct LogOption(Box<dyn FnOnce(&mut Options) + Send>);

impl LogOption {
    pub fn new(f: impl FnOnce(&mut Options) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn apply(self, options: &mut Options) {
        (self.0)(options);
    }
}

impl fmt::Debug for LogOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogOption")
    }
}

/// Options collected from option functions, before resolution
#[derive(Debug, Default)]
pub struct Options {
    pub level: Option<Level>,
    /// Flattened key/value pairs
    pub fields: Option<Vec<Value>>,
    pub output: Option<SharedWriter>,
    /// Backend-specific and host-supplied settings
    pub overrides: Overrides,
}

/// Typed override bag
///
/// Present values replace the corresponding configuration field. Boolean
/// flags only ever switch a behavior on.
#[derive(Clone, Default)]
pub struct Overrides {
    pub output: Option<SharedWriter>,
    pub hooks: Option<Vec<Arc<dyn Hook>>>,
    /// Seed fields as a map, flattened to pairs on resolution
    pub fields: Option<Map<String, Value>>,
    pub level: Option<Level>,
    pub time_format: Option<String>,
    pub exit: Option<ExitFn>,
    pub report_caller: bool,
    pub use_as_default: bool,
    pub development: bool,
    pub production: bool,
    /// Adopt this backend verbatim instead of building one
    pub backend: Option<Backend>,
    pub error: Option<SharedError>,
}

impl Overrides {
    /// Layer `other` on top of `self`
    pub fn merge(&mut self, other: Self) {
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.hooks.is_some() {
            self.hooks = other.hooks;
        }
        if other.fields.is_some() {
            self.fields = other.fields;
        }
        if other.level.is_some() {
            self.level = other.level;
        }
        if other.time_format.is_some() {
            self.time_format = other.time_format;
        }
        if other.exit.is_some() {
            self.exit = other.exit;
        }
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.error.is_some() {
            self.error = other.error;
        }
        self.report_caller |= other.report_caller;
        self.use_as_default |= other.use_as_default;
        self.development |= other.development;
        self.production |= other.production;
    }

    fn apply(self, config: &mut Configuration) {
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(hooks) = self.hooks {
            config.hooks = hooks;
        }
        if let Some(fields) = self.fields {
            config.seed_fields = fields
                .into_iter()
                .flat_map(|(k, v)| [Value::String(k), v])
                .collect();
        }
        if let Some(level) = self.level {
            config.severity_floor = Some(level);
        }
        if let Some(time_format) = self.time_format {
            config.time_format = Some(time_format);
        }
        if let Some(exit) = self.exit {
            config.exit = exit;
        }
        if self.report_caller {
            config.report_caller = true;
        }
        if self.use_as_default {
            config.use_as_default = true;
        }
        if self.development {
            config.mode = Mode::Development;
        }
        if self.production {
            config.mode = Mode::Production;
        }
        if let Some(backend) = self.backend {
            config.prebuilt = Some(backend);
        }
        if let Some(error) = self.error {
            config.error = Some(error);
        }
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("output", &self.output)
            .field("hooks", &self.hooks.as_ref().map(Vec::len))
            .field("fields", &self.fields)
            .field("level", &self.level)
            .field("time_format", &self.time_format)
            .field("report_caller", &self.report_caller)
            .field("use_as_default", &self.use_as_default)
            .field("development", &self.development)
            .field("production", &self.production)
            .field("backend", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}

/// Resolve `defaults` and `options` into one configuration
///
/// Never fails: seed field validation happens during initialization.
pub fn resolve<I>(defaults: Configuration, options: I) -> Configuration
where
    I: IntoIterator<Item = LogOption>,
{
    let mut collected = Options::default();
    for option in options {
        option.apply(&mut collected);
    }

    let mut config = defaults;
    if let Some(output) = collected.output {
        config.output = output;
    }
    if let Some(level) = collected.level {
        config.severity_floor = Some(level);
    }
    if let Some(fields) = collected.fields {
        config.seed_fields = fields;
    }
    collected.overrides.apply(&mut config);
    config
}

// Framework-level options

/// Set the severity floor
pub fn with_level(level: Level) -> LogOption {
    LogOption::new(move |o| o.level = Some(level))
}

/// Set seed fields as flattened key/value pairs
pub fn with_fields(fields: Vec<Value>) -> LogOption {
    LogOption::new(move |o| o.fields = Some(fields))
}

/// Set the output sink
pub fn with_output(output: impl Into<SharedWriter>) -> LogOption {
    let output = output.into();
    LogOption::new(move |o| o.output = Some(output))
}

// Backend-specific options

/// Attach hooks, run in order for every emitted record
pub fn with_hooks(hooks: Vec<Arc<dyn Hook>>) -> LogOption {
    LogOption::new(move |o| o.overrides.hooks = Some(hooks))
}

/// Seed fields from a map
pub fn with_field_map(fields: Map<String, Value>) -> LogOption {
    LogOption::new(move |o| o.overrides.fields = Some(fields))
}

/// Severity floor taking precedence over [`with_level`]
pub fn with_severity(level: Level) -> LogOption {
    LogOption::new(move |o| o.overrides.level = Some(level))
}

/// Set the timestamp format, a `time` format description
pub fn with_time_format(format: impl Into<String>) -> LogOption {
    let format = format.into();
    LogOption::new(move |o| o.overrides.time_format = Some(format))
}

/// Replace the exit function called after fatal records
pub fn with_exit(exit: impl Fn(i32) + Send + Sync + 'static) -> LogOption {
    let exit: ExitFn = Arc::new(exit);
    LogOption::new(move |o| o.overrides.exit = Some(exit))
}

/// Report the call site of every record
pub fn report_caller() -> LogOption {
    LogOption::new(|o| o.overrides.report_caller = true)
}

/// Publish the logger as the process default
pub fn use_as_default() -> LogOption {
    LogOption::new(|o| o.overrides.use_as_default = true)
}

/// Human readable console output
pub fn with_development_mode() -> LogOption {
    LogOption::new(|o| o.overrides.development = true)
}

/// Structured JSON output
pub fn with_production_mode() -> LogOption {
    LogOption::new(|o| o.overrides.production = true)
}

/// Adopt a caller-built backend, skipping every other setting
pub fn with_backend(backend: Backend) -> LogOption {
    LogOption::new(move |o| o.overrides.backend = Some(backend))
}

/// Render `err` under the reserved error field
pub fn with_error_field(err: impl Error + Send + Sync + 'static) -> LogOption {
    let err: SharedError = Arc::new(err);
    LogOption::new(move |o| o.overrides.error = Some(err))
}

/// Layer a host-supplied override bag
pub fn with_overrides(overrides: Overrides) -> LogOption {
    LogOption::new(move |o| o.overrides.merge(overrides))
}
