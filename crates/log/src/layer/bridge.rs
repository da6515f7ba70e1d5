//! Layer forwarding `tracing` events to the process default backend
//!
//! Code that logs through `tracing` macros without holding a handle reaches
//! whichever backend was last published with `use_as_default`. Events are
//! dropped while nothing is published. Events emitted by this crate itself
//! (target `switchlog`) are never forwarded.

// Standard library
use std::error::Error;
use std::fmt;

// External dependencies
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    layer::{Context, Layer},
    registry::LookupSpan,
};

// Internal crates
use crate::default;
use crate::level::{from_tracing, to_severity};

const OWN_TARGET: &str = "switchlog";

/// Layer that writes every `tracing` event through the default backend
#[derive(Debug, Default, Clone, Copy)]
pub struct BridgeLayer {
    _priv: (),
}

impl BridgeLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> Layer<S> for BridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with(OWN_TARGET) {
            return;
        }
        let Some(backend) = default::default_backend() else {
            return;
        };
        let severity = to_severity(from_tracing(meta.level()));
        if !backend.enabled(severity) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let caller = meta.file().zip(meta.line());
        backend.emit_with_fields(severity, visitor.message, caller, visitor.fields);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, Value)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            match value {
                Value::String(s) => self.message = s,
                other => self.message = other.to_string(),
            }
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.push(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Value::from(format!("{value:?}")));
    }
}
