//! Logger builder implementation
//!
//! [`LoggerBuilder`] turns a resolved [`Configuration`] into a live
//! [`Backend`]. It is also the only place that writes the process-wide
//! backend defaults in [`env`].

// Standard library
use std::sync::Arc;

// External dependencies
use serde_json::Value;

// Internal crates
use crate::backend::Backend;
use crate::backend::env::{self, StackMarshaler};
use crate::config::{Configuration, Mode};
use crate::core::{LogError, LogResult};
use crate::default;
use crate::format::{Encoder, TimeFormat};
use crate::level::{Level, to_severity};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Configuration,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Configuration) -> Self {
        Self { config }
    }

    /// Build the backend
    ///
    /// Returns the backend together with the configuration snapshot that
    /// produced it. A prebuilt backend in the configuration is adopted
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the seed fields are not string-keyed
    /// pairs. Validation runs before any process-wide state is touched.
    pub fn build(mut self) -> LogResult<(Backend, Configuration)> {
        if let Some(backend) = self.config.prebuilt.take() {
            tracing::debug!(target: "switchlog", "adopting prebuilt backend");
            return Ok((backend, self.config));
        }

        let config = self.config;
        let seed_fields = validate_seed_fields(&config.seed_fields)?;
        let time_format = config.time_format.as_deref().and_then(parse_time_format);

        env::reset();

        let mut backend = match config.mode {
            Mode::Development => {
                env::set_stack_marshaler(StackMarshaler::PrintBacktrace);
                let encoder = Encoder::Console {
                    time_format: time_format.clone().unwrap_or(TimeFormat::Kitchen),
                    colors: cfg!(feature = "ansi"),
                };
                Backend::new(config.output.clone())
                    .encoder(encoder)
                    .level(to_severity(Level::Debug))
            }
            Mode::Production => {
                env::set_stack_marshaler(StackMarshaler::SourceChain);
                Backend::new(config.output.clone()).level(to_severity(Level::Info))
            }
        }
        .with_timestamp()
        .with_stack();

        if let Some(level) = config.severity_floor {
            backend = backend.level(to_severity(level));
        }

        if config.report_caller {
            backend = backend.with_caller();
        }
        for hook in &config.hooks {
            backend = backend.hook(hook.clone());
        }

        if let Some(time_format) = time_format {
            env::set_time_format(time_format);
        }

        if !seed_fields.is_empty() {
            backend = backend.with_fields(seed_fields);
        }
        if let Some(err) = &config.error {
            backend = backend.with_error(err.clone());
        }

        if config.use_as_default {
            default::publish(backend.clone());
        }

        tracing::debug!(
            target: "switchlog",
            mode = ?config.mode,
            floor = %backend.floor(),
            caller = config.report_caller,
            hooks = config.hooks.len(),
            fields = backend.fields().len(),
            "logger initialized"
        );

        Ok((backend, config))
    }

    /// Build on top of a backend the caller supplied
    ///
    /// `parent` is the configuration `adopted` is currently installed
    /// under. Whatever this builder's configuration changes relative to it
    /// (output, floor, caller reporting, added hooks, added seed fields,
    /// error) is applied to a copy of `adopted`. Mode and time format stay
    /// with whoever built the adopted backend. A new prebuilt backend in
    /// the configuration replaces `adopted` outright.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the seed fields are not string-keyed
    /// pairs.
    pub fn derive(
        self,
        adopted: &Backend,
        parent: &Configuration,
    ) -> LogResult<(Backend, Configuration)> {
        if self.config.prebuilt.is_some() {
            return self.build();
        }

        let config = self.config;
        validate_seed_fields(&config.seed_fields)?;
        let added = config
            .seed_fields
            .strip_prefix(parent.seed_fields.as_slice())
            .unwrap_or(config.seed_fields.as_slice());
        let added = validate_seed_fields(added)?;

        let mut backend = adopted.clone();
        if !config.output.same_sink(&parent.output) {
            backend = backend.output(config.output.clone());
        }
        if config.severity_floor != parent.severity_floor
            && let Some(level) = config.severity_floor
        {
            backend = backend.level(to_severity(level));
        }
        if config.report_caller && !parent.report_caller {
            backend = backend.with_caller();
        }
        for hook in &config.hooks {
            if !parent.hooks.iter().any(|known| Arc::ptr_eq(known, hook)) {
                backend = backend.hook(Arc::clone(hook));
            }
        }
        if !added.is_empty() {
            backend = backend.with_fields(added);
        }
        if let Some(err) = &config.error
            && !parent.error.as_ref().is_some_and(|known| Arc::ptr_eq(known, err))
        {
            backend = backend.with_error(Arc::clone(err));
        }

        if config.use_as_default {
            default::publish(backend.clone());
        }

        tracing::debug!(
            target: "switchlog",
            floor = %backend.floor(),
            fields = backend.fields().len(),
            "derived from adopted backend"
        );

        Ok((backend, config))
    }
}

fn parse_time_format(description: &str) -> Option<TimeFormat> {
    if description.is_empty() {
        return None;
    }
    match TimeFormat::parse(description) {
        Ok(format) => Some(format),
        Err(e) => {
            tracing::warn!(
                target: "switchlog",
                format = description,
                error = %e,
                "invalid time format, keeping default"
            );
            None
        }
    }
}

/// Check that `fields` are string-keyed pairs and split them
pub fn validate_seed_fields(fields: &[Value]) -> LogResult<Vec<(String, Value)>> {
    if fields.len() % 2 != 0 {
        return Err(LogError::OddFieldCount {
            count: fields.len(),
        });
    }
    fields
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| match &pair[0] {
            Value::String(key) => Ok((key.clone(), pair[1].clone())),
            other => Err(LogError::FieldKeyType {
                position: i * 2,
                found: value_type(other),
            }),
        })
        .collect()
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryWriter, Severity, SharedWriter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_with(mem: &MemoryWriter) -> Configuration {
        Configuration {
            output: mem.clone().into(),
            ..Configuration::default()
        }
    }

    #[test]
    fn test_validate_pairs() {
        let pairs = validate_seed_fields(&[json!("a"), json!(1), json!("b"), json!(true)]).unwrap();
        assert_eq!(
            pairs,
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(true))]
        );
    }

    #[test]
    fn test_validate_odd_length() {
        let err = validate_seed_fields(&[json!("key")]).unwrap_err();
        assert_eq!(err, LogError::OddFieldCount { count: 1 });
        assert!(err.is_config());
    }

    #[test]
    fn test_validate_names_key_type() {
        let err = validate_seed_fields(&[json!("ok"), json!(1), json!(42), json!("v")]).unwrap_err();
        assert_eq!(
            err,
            LogError::FieldKeyType {
                position: 2,
                found: "number"
            }
        );
    }

    #[test]
    fn test_mode_floors() {
        let mem = MemoryWriter::new();
        let (prod, _) = LoggerBuilder::from_config(config_with(&mem)).build().unwrap();
        assert_eq!(prod.floor(), Severity::Info);
        assert!(prod.is_json());

        let dev_config = Configuration {
            mode: Mode::Development,
            ..config_with(&mem)
        };
        let (dev, _) = LoggerBuilder::from_config(dev_config).build().unwrap();
        assert_eq!(dev.floor(), Severity::Debug);
        assert!(!dev.is_json());
    }

    #[test]
    fn test_explicit_floor_wins_over_mode() {
        let mem = MemoryWriter::new();
        let config = Configuration {
            mode: Mode::Development,
            severity_floor: Some(Level::Error),
            ..config_with(&mem)
        };
        let (backend, _) = LoggerBuilder::from_config(config).build().unwrap();
        assert_eq!(backend.floor(), Severity::Error);
    }

    #[test]
    fn test_prebuilt_adopted_verbatim() {
        let sink = SharedWriter::from(MemoryWriter::new());
        let prebuilt = Backend::new(sink.clone()).level(Severity::Warn);
        let config = Configuration {
            prebuilt: Some(prebuilt),
            seed_fields: vec![json!("odd")],
            ..Configuration::default()
        };
        let (backend, snapshot) = LoggerBuilder::from_config(config).build().unwrap();
        assert_eq!(backend.floor(), Severity::Warn);
        assert!(backend.writer().same_sink(&sink));
        assert!(backend.fields().is_empty());
        assert!(snapshot.prebuilt.is_none());
    }

    #[test]
    fn test_derive_keeps_adopted_sink() {
        let mem = MemoryWriter::new();
        let adopted = Backend::new(mem.clone().into());
        let parent = Configuration::default();
        let child = Configuration {
            severity_floor: Some(Level::Warn),
            seed_fields: vec![json!("job"), json!("nightly")],
            ..parent.clone()
        };
        let (backend, _) = LoggerBuilder::from_config(child)
            .derive(&adopted, &parent)
            .unwrap();
        assert_eq!(backend.floor(), Severity::Warn);
        assert!(backend.writer().same_sink(adopted.writer()));

        backend.emit(Severity::Info, "quiet".into(), None);
        backend.emit(Severity::Error, "loud".into(), None);
        let out = mem.contents();
        assert!(!out.contains("quiet"));
        assert!(out.contains(r#""job":"nightly""#));
        assert_eq!(adopted.floor(), Severity::Trace);
    }

    #[test]
    fn test_derive_appends_only_new_fields() {
        let adopted = Backend::new(MemoryWriter::new().into())
            .with_fields([("a".to_string(), json!(1))]);
        let parent = Configuration {
            seed_fields: vec![json!("a"), json!(1)],
            ..Configuration::default()
        };
        let child = Configuration {
            seed_fields: vec![json!("a"), json!(1), json!("b"), json!(2)],
            ..parent.clone()
        };
        let (backend, _) = LoggerBuilder::from_config(child)
            .derive(&adopted, &parent)
            .unwrap();
        assert_eq!(
            backend.fields(),
            &[("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
        );
    }

    #[test]
    fn test_seed_fields_attached() {
        let mem = MemoryWriter::new();
        let config = Configuration {
            seed_fields: vec![json!("service"), json!("api")],
            ..config_with(&mem)
        };
        let (backend, _) = LoggerBuilder::from_config(config).build().unwrap();
        backend.emit(Severity::Info, "up".into(), None);
        assert!(mem.contents().contains(r#""service":"api""#));
    }

    #[test]
    fn test_invalid_fields_fail_build() {
        let config = Configuration {
            seed_fields: vec![json!(1), json!(2)],
            ..Configuration::default()
        };
        let err = LoggerBuilder::from_config(config).build().unwrap_err();
        assert!(err.is_config());
    }
}
