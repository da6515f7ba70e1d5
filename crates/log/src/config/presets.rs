//! Configuration presets for common scenarios

use super::{Configuration, Mode};
use crate::level::{Level, parse_level};

impl Configuration {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    ///
    /// Recognized variables:
    /// - `SWITCHLOG_LEVEL` (or `RUST_LOG` when it is a bare level name)
    /// - `SWITCHLOG_MODE`: `development`/`dev` or `production`/`prod`
    /// - `SWITCHLOG_TIME_FORMAT`
    /// - `SWITCHLOG_CALLER`: `1`/`true` enables caller reporting
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("SWITCHLOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.severity_floor = parse_level(level.trim()).ok();
        }

        if let Some(mode) = lookup("SWITCHLOG_MODE") {
            match mode.to_lowercase().as_str() {
                "development" | "dev" => config.mode = Mode::Development,
                "production" | "prod" => config.mode = Mode::Production,
                _ => {}
            }
        }

        if let Some(format) = lookup("SWITCHLOG_TIME_FORMAT").filter(|f| !f.is_empty()) {
            config.time_format = Some(format);
        }

        if let Some(caller) = lookup("SWITCHLOG_CALLER") {
            config.report_caller = matches!(caller.to_lowercase().as_str(), "1" | "true");
        }

        config
    }

    /// Development configuration (console output, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            mode: Mode::Development,
            severity_floor: Some(Level::Debug),
            report_caller: true,
            ..Self::default()
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            mode: Mode::Production,
            severity_floor: Some(Level::Info),
            ..Self::default()
        }
    }
}
