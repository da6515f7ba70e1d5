//! Records under construction and the hooks that can decorate them
//!
//! While a record is dispatched it sits in a thread-local slot, where the
//! formatters of the backend's fmt layer pick up its fields.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::Severity;

thread_local! {
    static CURRENT: RefCell<Option<Arc<Record>>> = const { RefCell::new(None) };
}

/// Run `f` with `record` installed as the record being dispatched
///
/// The previous record, if any, is restored afterwards.
pub(crate) fn scoped(record: Record, f: impl FnOnce(&Record)) {
    let record = Arc::new(record);
    let previous = CURRENT.replace(Some(Arc::clone(&record)));
    f(&record);
    CURRENT.set(previous);
}

/// Access the record being dispatched on this thread
pub(crate) fn with_current<R>(f: impl FnOnce(Option<&Record>) -> R) -> R {
    let record = CURRENT.with_borrow(Option::clone);
    f(record.as_deref())
}

/// A single log record before encoding
///
/// Fields keep insertion order. Duplicate keys are kept as-is and the
/// later value wins when the encoded record is read back.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    severity: Severity,
    pub(crate) message: String,
    pub(crate) caller: Option<String>,
    pub(crate) fields: Vec<(String, Value)>,
}

impl Record {
    pub(crate) fn new(severity: Severity, message: String) -> Self {
        Self {
            severity,
            message,
            caller: None,
            fields: Vec::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Last value recorded under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Add a string field
    pub fn str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.push((key.into(), Value::String(value.into())));
        self
    }

    /// Add a boolean field
    pub fn bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.fields.push((key.into(), Value::Bool(value)));
        self
    }

    /// Add any serializable field; values that fail to serialize are recorded as null
    pub fn field(&mut self, key: impl Into<String>, value: impl Serialize) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.push((key.into(), value));
        self
    }
}

/// Callback invoked once per emitted record, after level filtering
pub trait Hook: Send + Sync {
    fn run(&self, record: &mut Record, severity: Severity, message: &str);
}

/// Adapts a closure into a [`Hook`]
pub struct HookFn<F>(pub F);

impl<F> Hook for HookFn<F>
where
    F: Fn(&mut Record, Severity, &str) + Send + Sync,
{
    fn run(&self, record: &mut Record, severity: Severity, message: &str) {
        (self.0)(record, severity, message);
    }
}

impl<F> fmt::Debug for HookFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HookFn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_fn_adds_fields() {
        let hook = HookFn(|r: &mut Record, sev: Severity, msg: &str| {
            r.bool("has_level", sev != Severity::NoLevel);
            r.str("echo", msg);
        });
        let mut record = Record::new(Severity::Info, "hello".to_string());
        hook.run(&mut record, Severity::Info, "hello");
        assert_eq!(record.get("has_level"), Some(&Value::Bool(true)));
        assert_eq!(record.get("echo"), Some(&Value::from("hello")));
    }

    #[test]
    fn test_get_returns_last_write() {
        let mut record = Record::new(Severity::Warn, String::new());
        record.field("n", 1).field("n", 2);
        assert_eq!(record.get("n"), Some(&Value::from(2)));
        assert_eq!(record.fields().len(), 2);
    }

    #[test]
    fn test_scoped_record_restores_previous() {
        assert!(with_current(|r| r.is_none()));
        scoped(Record::new(Severity::Info, "outer".into()), |_| {
            scoped(Record::new(Severity::Warn, "inner".into()), |_| {
                assert_eq!(with_current(|r| r.map(Record::severity)), Some(Severity::Warn));
            });
            assert_eq!(
                with_current(|r| r.map(|r| r.message().to_string())),
                Some("outer".to_string())
            );
        });
        assert!(with_current(|r| r.is_none()));
    }
}
