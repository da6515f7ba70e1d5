//! Format utilities (timers, record formatters for the fmt layer)

// Standard library
use std::fmt::{self, Write as _};

// External dependencies
use serde::ser::{SerializeMap, Serializer as _};
use serde_json::Value;
use time::error::InvalidFormatDescription;
use time::format_description::OwnedFormatItem;
use time::macros::format_description;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, UtcTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

// Internal crates
use crate::backend::{Record, Severity, env, record};

/// How timestamps are rendered
#[derive(Debug, Clone, Default)]
pub enum TimeFormat {
    /// RFC 3339, the structured default
    #[default]
    Rfc3339,
    /// `3:04PM`, the console default
    Kitchen,
    /// A `time` format description such as `[hour]:[minute]:[second]`
    Custom(UtcTime<OwnedFormatItem>),
}

impl TimeFormat {
    /// Parse a format description
    pub fn parse(description: &str) -> Result<Self, InvalidFormatDescription> {
        time::format_description::parse_owned::<2>(description)
            .map(|items| Self::Custom(UtcTime::new(items)))
    }
}

impl FormatTime for TimeFormat {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self {
            Self::Rfc3339 => UtcTime::rfc_3339().format_time(w),
            Self::Kitchen => {
                UtcTime::new(format_description!("[hour repr:12 padding:none]:[minute][period]"))
                    .format_time(w)
            }
            Self::Custom(timer) => timer.format_time(w),
        }
    }
}

/// Timer that reads the process-wide time format on every record
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTime;

impl FormatTime for ProcessTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        env::current().time_format.format_time(w)
    }
}

/// Output encoding of a backend instance
#[derive(Debug, Clone)]
pub enum Encoder {
    /// One JSON object per line
    Json,
    /// Human readable single line
    Console { time_format: TimeFormat, colors: bool },
}

impl Encoder {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Collects the `message` field of an event
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{value:?}");
        }
    }
}

/// Event format writing one JSON object per record
///
/// Keys come out as `level`, `time`, `caller`, the record fields in
/// insertion order, then `message`. Duplicate keys are written twice and
/// the later one wins when read back.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    timestamp: bool,
}

impl JsonFormat {
    pub fn new(timestamp: bool) -> Self {
        Self { timestamp }
    }

    fn serialize(
        self,
        record: Option<&Record>,
        event: &Event<'_>,
        message: &str,
    ) -> serde_json::Result<String> {
        let mut buf = Vec::with_capacity(128);
        let mut serializer = serde_json::Serializer::new(&mut buf);
        let mut map = serializer.serialize_map(None)?;

        match record.map(Record::severity) {
            Some(Severity::NoLevel) => {}
            Some(severity) => map.serialize_entry("level", severity.as_str())?,
            None => map.serialize_entry(
                "level",
                &event.metadata().level().as_str().to_ascii_lowercase(),
            )?,
        }
        if self.timestamp {
            let mut time = String::new();
            if ProcessTime.format_time(&mut Writer::new(&mut time)).is_ok() {
                map.serialize_entry("time", &time)?;
            }
        }
        if let Some(record) = record {
            if let Some(caller) = record.caller() {
                map.serialize_entry("caller", caller)?;
            }
            for (key, value) in record.fields() {
                map.serialize_entry(key, value)?;
            }
        }
        if !message.is_empty() {
            map.serialize_entry("message", message)?;
        }
        map.end()?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = Message::default();
        event.record(&mut message);
        let line = record::with_current(|record| self.serialize(record, event, &message.0))
            .map_err(|_| fmt::Error)?;
        writer.write_str(&line)?;
        writeln!(writer)
    }
}

/// Field format of the console layout: `[caller >] message key=value ...`
///
/// Record fields are sorted by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFields;

impl<'writer> FormatFields<'writer> for ConsoleFields {
    fn format_fields<R: RecordFields>(&self, mut writer: Writer<'writer>, fields: R) -> fmt::Result {
        let mut message = Message::default();
        fields.record(&mut message);

        record::with_current(|record| {
            if let Some(caller) = record.and_then(Record::caller) {
                write!(writer, "{caller} > ")?;
            }
            writer.write_str(&message.0)?;

            let mut fields: Vec<&(String, Value)> =
                record.map(Record::fields).unwrap_or_default().iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in fields {
                write!(writer, " {key}={}", console_value(value))?;
            }
            Ok(())
        })
    }
}

fn console_value(value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() && !s.contains(char::is_whitespace) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryWriter};
    use pretty_assertions::assert_eq;

    fn sample(backend: &Backend) {
        backend.emit_with_fields(
            Severity::Info,
            "hello world".into(),
            None,
            vec![("user".into(), Value::from("ann")), ("attempt".into(), Value::from(3))],
        );
    }

    fn render(timer: &impl FormatTime) -> String {
        let mut out = String::new();
        timer.format_time(&mut Writer::new(&mut out)).unwrap();
        out
    }

    #[test]
    fn test_json_layout() {
        let mem = MemoryWriter::new();
        sample(&Backend::new(mem.clone().into()));
        assert_eq!(
            mem.contents(),
            "{\"level\":\"info\",\"user\":\"ann\",\"attempt\":3,\"message\":\"hello world\"}\n"
        );
    }

    #[test]
    fn test_console_layout_without_colors() {
        let mem = MemoryWriter::new();
        let backend = Backend::new(mem.clone().into()).encoder(Encoder::Console {
            time_format: TimeFormat::Kitchen,
            colors: false,
        });
        sample(&backend);
        let line = mem.contents();
        assert_eq!(line.trim(), "INFO hello world attempt=3 user=ann");
    }

    #[test]
    fn test_console_quotes_spaced_strings() {
        assert_eq!(console_value(&Value::from("a b")), "\"a b\"");
        assert_eq!(console_value(&Value::from("ab")), "ab");
        assert_eq!(console_value(&Value::from("")), "\"\"");
    }

    #[test]
    fn test_custom_time_format() {
        let tf = TimeFormat::parse("[hour]:[minute]:[second]").unwrap();
        let rendered = render(&tf);
        assert_eq!(rendered.len(), 8);
        assert_eq!(rendered.matches(':').count(), 2);
        assert!(TimeFormat::parse("[nonsense").is_err());
    }

    #[test]
    fn test_builtin_time_formats() {
        assert!(render(&TimeFormat::Rfc3339).contains('T'));
        let kitchen = render(&TimeFormat::Kitchen);
        assert!(kitchen.ends_with("AM") || kitchen.ends_with("PM"), "{kitchen}");
    }
}
