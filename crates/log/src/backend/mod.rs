//! Structured record engine
//!
//! A [`Backend`] is an immutable value: every builder method consumes it and
//! returns a new instance, so a backend handed to one owner can never be
//! changed underneath another. Cloning is cheap (the sink, hooks and
//! subscriber are reference counted).
//!
//! Records are written by a `tracing-subscriber` fmt layer owned by the
//! backend: each backend builds its own [`Dispatch`] (registry, level filter,
//! fmt layer on the backend's sink) and dispatches records to it directly.

pub mod env;
pub(crate) mod record;
mod severity;
mod writer;

pub use record::{Hook, HookFn, Record};
pub use severity::Severity;
pub use writer::{MemoryWriter, SharedWriter, SinkGuard};

// Standard library
use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock};

// External dependencies
use serde_json::Value;
use tracing::callsite::{DefaultCallsite, Identifier};
use tracing::field::FieldSet;
use tracing::metadata::Kind;
use tracing::{Dispatch, Event, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{Layer, Registry, fmt as fmt_layer};

// Internal crates
use crate::format::{ConsoleFields, Encoder, JsonFormat};
use crate::{ERROR_FIELD_NAME, STACK_FIELD_NAME};

/// Target of the events a backend dispatches to its own subscriber
pub const RECORD_TARGET: &str = "switchlog::record";

/// Error value attached to every record of a backend
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

type Filtered = Layered<LevelFilter, Registry>;

/// Static event metadata with a single `message` field
macro_rules! record_metadata {
    ($level:expr) => {{
        static CALLSITE: DefaultCallsite = DefaultCallsite::new(&META);
        static META: Metadata<'static> = Metadata::new(
            "switchlog record",
            RECORD_TARGET,
            $level,
            Some(file!()),
            Some(line!()),
            Some(module_path!()),
            FieldSet::new(&["message"], Identifier(&CALLSITE)),
            Kind::EVENT,
        );
        &META
    }};
}

fn metadata(severity: Severity) -> &'static Metadata<'static> {
    match severity {
        Severity::Trace => record_metadata!(tracing::Level::TRACE),
        Severity::Debug => record_metadata!(tracing::Level::DEBUG),
        Severity::Info | Severity::NoLevel => record_metadata!(tracing::Level::INFO),
        Severity::Warn => record_metadata!(tracing::Level::WARN),
        Severity::Error | Severity::Fatal | Severity::Panic | Severity::Disabled => {
            record_metadata!(tracing::Level::ERROR)
        }
    }
}

/// A configured backend logger instance
#[derive(Clone)]
pub struct Backend {
    writer: SharedWriter,
    encoder: Encoder,
    floor: Severity,
    fields: Vec<(String, Value)>,
    hooks: Vec<Arc<dyn Hook>>,
    timestamp: bool,
    stack: bool,
    caller: bool,
    error: Option<SharedError>,
    /// Built on first use, reset by every setter that changes it
    dispatch: OnceLock<Dispatch>,
}

impl Backend {
    /// JSON backend writing to `writer`, emitting every level
    pub fn new(writer: SharedWriter) -> Self {
        Self {
            writer,
            encoder: Encoder::Json,
            floor: Severity::Trace,
            fields: Vec::new(),
            hooks: Vec::new(),
            timestamp: false,
            stack: false,
            caller: false,
            error: None,
            dispatch: OnceLock::new(),
        }
    }

    pub fn encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self.dispatch = OnceLock::new();
        self
    }

    pub fn output(mut self, writer: SharedWriter) -> Self {
        self.writer = writer;
        self.dispatch = OnceLock::new();
        self
    }

    /// Set the minimum emitted severity
    pub fn level(mut self, floor: Severity) -> Self {
        self.floor = floor;
        self.dispatch = OnceLock::new();
        self
    }

    /// Stamp every record with the current time
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = true;
        self.dispatch = OnceLock::new();
        self
    }

    /// Render attached errors through the process stack marshaler
    pub fn with_stack(mut self) -> Self {
        self.stack = true;
        self
    }

    /// Record the call site of every record
    pub fn with_caller(mut self) -> Self {
        self.caller = true;
        self
    }

    pub fn hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Append permanent fields
    pub fn with_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.fields.extend(fields);
        self
    }

    pub fn with_error(mut self, err: SharedError) -> Self {
        self.error = Some(err);
        self
    }

    pub fn floor(&self) -> Severity {
        self.floor
    }

    pub fn writer(&self) -> &SharedWriter {
        &self.writer
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn is_json(&self) -> bool {
        self.encoder.is_json()
    }

    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        self.floor != Severity::Disabled && severity >= self.floor
    }

    /// Build, decorate and write one record
    ///
    /// `caller` is a `(file, line)` pair, only rendered when caller
    /// reporting is enabled.
    pub fn emit(&self, severity: Severity, message: String, caller: Option<(&str, u32)>) {
        self.emit_with_fields(severity, message, caller, Vec::new());
    }

    /// Like [`emit`](Self::emit), with per-record fields placed after the
    /// permanent ones
    pub fn emit_with_fields(
        &self,
        severity: Severity,
        message: String,
        caller: Option<(&str, u32)>,
        fields: Vec<(String, Value)>,
    ) {
        if !self.enabled(severity) {
            return;
        }
        let record = self.record(severity, message, caller, fields);
        record::scoped(record, |record| self.dispatch_record(record));
    }

    fn record(
        &self,
        severity: Severity,
        message: String,
        caller: Option<(&str, u32)>,
        fields: Vec<(String, Value)>,
    ) -> Record {
        let mut record = Record::new(severity, message);
        if self.caller {
            record.caller = caller.map(|(file, line)| format!("{file}:{line}"));
        }
        record.fields.extend(self.fields.iter().cloned());
        record.fields.extend(fields);

        if let Some(err) = &self.error {
            record.str(ERROR_FIELD_NAME, err.to_string());
            if self.stack
                && let Some(stack) = env::current().stack_marshaler.marshal(&**err)
            {
                record.fields.push((STACK_FIELD_NAME.to_string(), stack));
            }
        }

        if !self.hooks.is_empty() {
            let message = record.message.clone();
            for hook in &self.hooks {
                hook.run(&mut record, severity, &message);
            }
        }
        record
    }

    // Dispatched directly rather than through the thread's default
    // subscriber: the bridge layer calls in from inside another subscriber.
    fn dispatch_record(&self, record: &Record) {
        let meta = metadata(record.severity());
        let dispatch = self.dispatcher();
        if !dispatch.enabled(meta) {
            return;
        }
        let Some(field) = meta.fields().field("message") else {
            return;
        };
        let message = record.message();
        let values = [(&field, Some(&message as &dyn tracing::Value))];
        dispatch.event(&Event::new(meta, &meta.fields().value_set(&values)));
    }

    fn dispatcher(&self) -> &Dispatch {
        self.dispatch.get_or_init(|| {
            let layer: Box<dyn Layer<Filtered> + Send + Sync> = match &self.encoder {
                Encoder::Json => fmt_layer::layer()
                    .event_format(JsonFormat::new(self.timestamp))
                    .with_writer(self.writer.clone())
                    .log_internal_errors(false)
                    .boxed(),
                Encoder::Console {
                    time_format,
                    colors,
                } => {
                    let layer = fmt_layer::layer()
                        .compact()
                        .fmt_fields(ConsoleFields)
                        .with_target(false)
                        .with_ansi(*colors)
                        .with_writer(self.writer.clone())
                        .log_internal_errors(false);
                    if self.timestamp {
                        layer.with_timer(time_format.clone()).boxed()
                    } else {
                        layer.without_time().boxed()
                    }
                }
            };
            Dispatch::new(
                Registry::default()
                    .with(self.floor.level_filter())
                    .with(layer),
            )
        })
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("encoder", &self.encoder)
            .field("floor", &self.floor)
            .field("fields", &self.fields)
            .field("hooks", &self.hooks.len())
            .field("timestamp", &self.timestamp)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}
