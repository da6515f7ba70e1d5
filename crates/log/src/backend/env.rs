//! Process-wide backend defaults
//!
//! The record engine keeps a small set of formatting defaults that apply to
//! every backend instance in the process: the timestamp format and the
//! error stack marshaler. They live here, behind an `ArcSwap`, and are only
//! written by the initializer. Re-initialization is therefore a
//! serialization point: two threads initializing loggers at the same time
//! may observe each other's settings.

use std::backtrace::Backtrace;
use std::error::Error;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::format::TimeFormat;

static ENVIRONMENT: LazyLock<ArcSwap<Environment>> =
    LazyLock::new(|| ArcSwap::from_pointee(Environment::default()));

/// How errors attached to a record are turned into a `stack` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackMarshaler {
    /// No stack rendering
    #[default]
    None,
    /// Render the `source()` chain as a JSON array
    SourceChain,
    /// Print a captured backtrace to stderr and render nothing
    PrintBacktrace,
}

impl StackMarshaler {
    pub fn marshal(self, err: &(dyn Error + 'static)) -> Option<Value> {
        match self {
            Self::None => None,
            Self::SourceChain => {
                let mut chain = Vec::new();
                let mut current = Some(err);
                while let Some(e) = current {
                    chain.push(Value::String(e.to_string()));
                    current = e.source();
                }
                Some(Value::Array(chain))
            }
            Self::PrintBacktrace => {
                eprintln!("{}", Backtrace::force_capture());
                None
            }
        }
    }
}

/// Snapshot of the process-wide defaults
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub time_format: TimeFormat,
    pub stack_marshaler: StackMarshaler,
}

/// Current defaults (cheap `Arc` clone)
#[inline]
pub fn current() -> Arc<Environment> {
    ENVIRONMENT.load_full()
}

/// Restore the defaults: RFC 3339 timestamps and no stack marshaling
pub fn reset() {
    ENVIRONMENT.store(Arc::new(Environment::default()));
}

pub fn set_time_format(time_format: TimeFormat) {
    ENVIRONMENT.rcu(|env| Environment {
        time_format: time_format.clone(),
        ..(**env).clone()
    });
}

pub fn set_stack_marshaler(marshaler: StackMarshaler) {
    ENVIRONMENT.rcu(|env| Environment {
        stack_marshaler: marshaler,
        ..(**env).clone()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk full")
        }
    }

    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("write failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_source_chain_marshaler() {
        let stack = StackMarshaler::SourceChain.marshal(&Outer(Inner)).unwrap();
        assert_eq!(stack, serde_json::json!(["write failed", "disk full"]));
    }

    #[test]
    fn test_non_rendering_marshalers() {
        assert!(StackMarshaler::None.marshal(&Inner).is_none());
        assert!(StackMarshaler::PrintBacktrace.marshal(&Inner).is_none());
    }
}
