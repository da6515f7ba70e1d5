//! The pluggable logger interface
//!
//! Call sites depend on [`Logger`] only, so the backend behind it can be
//! swapped without touching them.

use std::fmt;

use serde_json::Value;

use crate::config::Configuration;
use crate::core::LogResult;
use crate::level::Level;
use crate::options::LogOption;

/// A leveled, structured logger
///
/// Plain variants (`info`, ...) concatenate their arguments without
/// separators; formatted variants (`infof`, ...) take `format_args!`.
/// Fatal variants emit the record and then call the configured exit
/// function with status `1`.
pub trait Logger: Send + Sync {
    /// Re-initialize from the current configuration plus `options`
    fn init(&self, options: Vec<LogOption>) -> LogResult<()>;

    /// Snapshot of the current configuration
    fn options(&self) -> Configuration;

    /// New logger carrying additional flattened key/value fields
    fn fields(&self, fields: Vec<Value>) -> LogResult<Self>
    where
        Self: Sized;

    #[track_caller]
    fn log(&self, level: Level, args: &[&dyn fmt::Display]);

    #[track_caller]
    fn logf(&self, level: Level, args: fmt::Arguments<'_>);

    /// Backend name
    fn name(&self) -> &'static str;

    #[track_caller]
    fn trace(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Trace, args);
    }

    #[track_caller]
    fn tracef(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Trace, args);
    }

    #[track_caller]
    fn debug(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Debug, args);
    }

    #[track_caller]
    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args);
    }

    #[track_caller]
    fn info(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Info, args);
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args);
    }

    #[track_caller]
    fn warn(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Warn, args);
    }

    #[track_caller]
    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warn, args);
    }

    #[track_caller]
    fn error(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Error, args);
    }

    #[track_caller]
    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args);
    }

    #[track_caller]
    fn fatal(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Fatal, args);
    }

    #[track_caller]
    fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Fatal, args);
    }
}
