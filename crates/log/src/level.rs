//! Logger levels and their mapping onto backend severities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend::Severity;
use crate::core::{LogError, LogResult};

/// Severity vocabulary of the pluggable logger interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Self; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    pub fn as_str(self) -> &'static str {
        to_severity(self).as_str()
    }

    /// Whether a record at `self` passes a floor of `floor`
    #[inline]
    pub fn enabled(self, floor: Self) -> bool {
        self >= floor
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(s)
    }
}

/// Parse a level string such as `"debug"`
///
/// Accepts the backend vocabulary; labels with no logger counterpart
/// (`panic`, `disabled`, empty) map to `Info`.
pub fn parse_level(input: &str) -> LogResult<Level> {
    input
        .parse::<Severity>()
        .map(from_severity)
        .map_err(|_| LogError::unknown_level(input))
}

/// Map a logger level onto the backend vocabulary
pub fn to_severity(level: Level) -> Severity {
    match level {
        Level::Trace => Severity::Trace,
        Level::Debug => Severity::Debug,
        Level::Info => Severity::Info,
        Level::Warn => Severity::Warn,
        Level::Error => Severity::Error,
        Level::Fatal => Severity::Fatal,
    }
}

/// Map a backend severity back; anything without a counterpart is `Info`
pub fn from_severity(severity: Severity) -> Level {
    match severity {
        Severity::Trace => Level::Trace,
        Severity::Debug => Level::Debug,
        Severity::Info => Level::Info,
        Severity::Warn => Level::Warn,
        Severity::Error => Level::Error,
        Severity::Fatal => Level::Fatal,
        Severity::Panic | Severity::NoLevel | Severity::Disabled => Level::Info,
    }
}

/// Map a `tracing` level, used when forwarding `tracing` events
pub fn from_tracing(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => Level::Trace,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        _ => Level::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_round_trip() {
        for level in Level::ALL {
            assert_eq!(from_severity(to_severity(level)), level);
        }
    }

    #[test]
    fn test_mapping_preserves_order() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(to_severity(pair[0]) < to_severity(pair[1]));
        }
    }

    #[rstest]
    #[case(Severity::Panic)]
    #[case(Severity::NoLevel)]
    #[case(Severity::Disabled)]
    fn test_unmapped_fails_open_to_info(#[case] severity: Severity) {
        assert_eq!(from_severity(severity), Level::Info);
    }

    #[rstest]
    #[case("trace", Level::Trace)]
    #[case("debug", Level::Debug)]
    #[case("info", Level::Info)]
    #[case("warn", Level::Warn)]
    #[case("error", Level::Error)]
    #[case("fatal", Level::Fatal)]
    #[case("panic", Level::Info)]
    fn test_parse_level(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(parse_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_names_input() {
        let err = "chatty".parse::<Level>().unwrap_err();
        assert_eq!(err, LogError::unknown_level("chatty"));
        assert!(err.to_string().contains("'chatty'"));
    }

    #[test]
    fn test_floor_comparison() {
        assert!(Level::Warn.enabled(Level::Warn));
        assert!(Level::Fatal.enabled(Level::Trace));
        assert!(!Level::Debug.enabled(Level::Info));
    }

    #[test]
    fn test_from_tracing() {
        assert_eq!(from_tracing(&tracing::Level::WARN), Level::Warn);
        assert_eq!(from_tracing(&tracing::Level::TRACE), Level::Trace);
    }
}
