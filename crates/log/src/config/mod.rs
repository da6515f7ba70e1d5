//! Resolved logger configuration

mod presets;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{Backend, Hook, SharedError, SharedWriter};
use crate::level::Level;

/// Process termination capability invoked after a fatal record
pub type ExitFn = Arc<dyn Fn(i32) + Send + Sync>;

fn process_exit(code: i32) {
    std::process::exit(code)
}

/// Output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Structured JSON records, info floor
    #[default]
    Production,
    /// Human readable console records, debug floor
    Development,
}

/// A fully resolved configuration snapshot
///
/// Produced by [`resolve`](crate::options::resolve) and consumed by
/// [`LoggerBuilder`](crate::LoggerBuilder). Handles keep the snapshot that
/// built them so children can be derived without resolving from scratch.
#[derive(Clone)]
pub struct Configuration {
    /// Sink for encoded records
    pub output: SharedWriter,
    /// Explicit floor; `None` means the mode decides
    pub severity_floor: Option<Level>,
    pub mode: Mode,
    /// Decorate records with the call site
    pub report_caller: bool,
    /// Publish the built backend as the process default
    pub use_as_default: bool,
    /// `time` format description for timestamps; `None` keeps the backend default
    pub time_format: Option<String>,
    pub hooks: Vec<Arc<dyn Hook>>,
    /// Flattened key/value pairs, keys must be strings
    pub seed_fields: Vec<Value>,
    pub exit: ExitFn,
    /// Error rendered under the reserved error field
    pub error: Option<SharedError>,
    /// Caller-built backend adopted verbatim by the next initialization
    pub prebuilt: Option<Backend>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            output: SharedWriter::stderr(),
            severity_floor: None,
            mode: Mode::Production,
            report_caller: false,
            use_as_default: false,
            time_format: None,
            hooks: Vec::new(),
            seed_fields: Vec::new(),
            exit: Arc::new(process_exit),
            error: None,
            prebuilt: None,
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("output", &self.output)
            .field("severity_floor", &self.severity_floor)
            .field("mode", &self.mode)
            .field("report_caller", &self.report_caller)
            .field("use_as_default", &self.use_as_default)
            .field("time_format", &self.time_format)
            .field("hooks", &self.hooks.len())
            .field("seed_fields", &self.seed_fields)
            .field("error", &self.error.as_ref().map(ToString::to_string))
            .field("prebuilt", &self.prebuilt.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.mode, Mode::Production);
        assert!(config.output.is_stderr());
        assert!(config.severity_floor.is_none());
        assert!(!config.report_caller);
        assert!(!config.use_as_default);
        assert!(config.time_format.is_none());
        assert!(config.hooks.is_empty());
        assert!(config.seed_fields.is_empty());
        assert!(config.prebuilt.is_none());
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(
            serde_json::to_value(Mode::Development).unwrap(),
            Value::from("development")
        );
        let mode: Mode = serde_json::from_value(Value::from("production")).unwrap();
        assert_eq!(mode, Mode::Production);
    }
}
