//! Native severity vocabulary of the record engine

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;

use crate::core::LogError;

/// Severity of a record as understood by the backend
///
/// Ordering follows emission priority: a backend with floor `Warn` emits
/// `Warn`, `Error`, `Fatal` and `Panic`. `NoLevel` records carry no level
/// label and are emitted unless the backend is `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
    NoLevel,
    Disabled,
}

impl Severity {
    /// Label rendered in structured records
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
            Self::NoLevel => "",
            Self::Disabled => "disabled",
        }
    }

    /// Strictest `tracing` filter that still passes every record at or
    /// above this floor
    pub(crate) fn level_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info | Self::NoLevel => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error | Self::Fatal | Self::Panic => LevelFilter::ERROR,
            Self::Disabled => LevelFilter::OFF,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "panic" => Ok(Self::Panic),
            "disabled" => Ok(Self::Disabled),
            "" => Ok(Self::NoLevel),
            _ => Err(LogError::unknown_level(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Error < Severity::Fatal);
        assert!(Severity::Fatal < Severity::Disabled);
    }

    #[test]
    fn test_parse_labels() {
        for sev in [
            Severity::Trace,
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::Fatal,
            Severity::Panic,
        ] {
            assert_eq!(sev.as_str().parse::<Severity>().unwrap(), sev);
        }
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_filter_never_stricter_than_floor() {
        assert_eq!(Severity::Fatal.level_filter(), LevelFilter::ERROR);
        assert_eq!(Severity::NoLevel.level_filter(), LevelFilter::INFO);
        assert_eq!(Severity::Disabled.level_filter(), LevelFilter::OFF);
    }
}
