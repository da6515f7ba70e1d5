//! The caller-facing logger handle

// Standard library
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::Arc;

// External dependencies
use arc_swap::ArcSwap;
use serde_json::Value;

// Internal crates
use crate::backend::{Backend, SharedError};
use crate::builder::LoggerBuilder;
use crate::config::Configuration;
use crate::core::LogResult;
use crate::level::{Level, from_severity, to_severity};
use crate::logger::Logger;
use crate::options::{LogOption, resolve, with_fields};

const NAME: &str = "switchlog";

/// Backend instance plus the configuration that produced it
struct State {
    backend: Backend,
    config: Configuration,
    /// The backend was supplied by the caller rather than built
    adopted: bool,
}

impl State {
    /// Build the state for `config`
    ///
    /// Without a `parent` the backend is built from scratch. Under an
    /// adopted parent it is derived from the parent's backend, so the
    /// caller's backend survives re-initialization and children.
    fn build(config: Configuration, parent: Option<&Self>) -> LogResult<Self> {
        let replaces = config.prebuilt.is_some();
        let builder = LoggerBuilder::from_config(config);
        let (backend, config) = match parent {
            Some(parent) if parent.adopted => builder.derive(&parent.backend, &parent.config)?,
            _ => builder.build()?,
        };
        Ok(Self {
            backend,
            config,
            adopted: replaces || parent.is_some_and(|p| p.adopted),
        })
    }
}

/// A logger handle
///
/// Re-initialization and [`set_level`](Self::set_level) swap the whole
/// state at once, so concurrent callers see either the old or the new
/// logger, never a mix. Deriving methods ([`fields`](Logger::fields),
/// [`clone_with`](Self::clone_with), [`with_error`](Self::with_error))
/// return independent handles and leave the receiver untouched.
pub struct Handle {
    state: ArcSwap<State>,
}

impl Handle {
    /// Build a handle from default configuration plus `options`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed seed fields.
    pub fn new<I>(options: I) -> LogResult<Self>
    where
        I: IntoIterator<Item = LogOption>,
    {
        Self::from_config(resolve(Configuration::default(), options))
    }

    /// Build a handle from an already resolved configuration
    pub fn from_config(config: Configuration) -> LogResult<Self> {
        Ok(Self {
            state: ArcSwap::from_pointee(State::build(config, None)?),
        })
    }

    /// New handle with `options` layered on this handle's configuration
    ///
    /// The child does not inherit `use_as_default`; pass
    /// [`use_as_default`](crate::options::use_as_default) again to publish it.
    pub fn clone_with<I>(&self, options: I) -> LogResult<Self>
    where
        I: IntoIterator<Item = LogOption>,
    {
        let state = self.state.load();
        let mut base = state.config.clone();
        base.use_as_default = false;
        let next = State::build(resolve(base, options), Some(&**state))?;
        Ok(Self {
            state: ArcSwap::from_pointee(next),
        })
    }

    /// New handle whose records carry `err` under the error field
    pub fn with_error(&self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        let err: SharedError = Arc::new(err);
        let state = self.state.load();
        let mut config = state.config.clone();
        config.use_as_default = false;
        config.error = Some(err.clone());
        Self {
            state: ArcSwap::from_pointee(State {
                backend: state.backend.clone().with_error(err),
                config,
                adopted: state.adopted,
            }),
        }
    }

    /// Change the floor without re-initializing
    pub fn set_level(&self, level: Level) {
        self.state.rcu(|state| State {
            backend: state.backend.clone().level(to_severity(level)),
            config: Configuration {
                severity_floor: Some(level),
                ..state.config.clone()
            },
            adopted: state.adopted,
        });
    }

    /// Effective floor
    pub fn level(&self) -> Level {
        from_severity(self.state.load().backend.floor())
    }

    /// Whether a record at `level` would be emitted
    pub fn enabled(&self, level: Level) -> bool {
        self.state.load().backend.enabled(to_severity(level))
    }

    /// The current backend instance
    pub fn backend(&self) -> Backend {
        self.state.load().backend.clone()
    }

    #[track_caller]
    fn emit(&self, level: Level, message: impl FnOnce() -> String) {
        let state = self.state.load();
        let severity = to_severity(level);
        if state.backend.enabled(severity) {
            let caller = Location::caller();
            state
                .backend
                .emit(severity, message(), Some((caller.file(), caller.line())));
        }
        if level == Level::Fatal {
            let exit = state.config.exit.clone();
            drop(state);
            exit(1);
        }
    }
}

impl Logger for Handle {
    fn init(&self, options: Vec<LogOption>) -> LogResult<()> {
        let state = self.state.load();
        let config = resolve(state.config.clone(), options);
        let next = State::build(config, Some(&**state))?;
        self.state.store(Arc::new(next));
        Ok(())
    }

    fn options(&self) -> Configuration {
        self.state.load().config.clone()
    }

    fn fields(&self, fields: Vec<Value>) -> LogResult<Self> {
        let mut combined = self.state.load().config.seed_fields.clone();
        combined.extend(fields);
        self.clone_with([with_fields(combined)])
    }

    fn log(&self, level: Level, args: &[&dyn fmt::Display]) {
        self.emit(level, || {
            let mut message = String::new();
            for arg in args {
                let _ = write!(message, "{arg}");
            }
            message
        });
    }

    fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        self.emit(level, || args.to_string());
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

impl Default for Handle {
    /// Production logger on stderr
    fn default() -> Self {
        match Self::new([]) {
            Ok(handle) => handle,
            // Seed fields are the only input that can fail and the default has none.
            Err(e) => unreachable!("default configuration rejected: {e}"),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAME)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        f.debug_struct("Handle")
            .field("backend", &state.backend)
            .field("config", &state.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryWriter;
    use crate::options::{with_level, with_output};
    use serde_json::json;

    fn capture(options: Vec<LogOption>) -> (MemoryWriter, Handle) {
        let mem = MemoryWriter::new();
        let mut all = vec![with_output(mem.clone())];
        all.extend(options);
        (mem, Handle::new(all).unwrap())
    }

    #[test]
    fn test_name() {
        let handle = Handle::default();
        assert_eq!(handle.name(), "switchlog");
        assert_eq!(handle.to_string(), "switchlog");
    }

    #[test]
    fn test_plain_join_has_no_separators() {
        let (mem, handle) = capture(vec![]);
        handle.info(&[&"a", &1, &"b"]);
        assert!(mem.contents().contains(r#""message":"a1b""#));
    }

    #[test]
    fn test_message_not_built_below_floor() {
        let (mem, handle) = capture(vec![with_level(Level::Warn)]);
        let mut built = false;
        handle.emit(Level::Info, || {
            built = true;
            String::new()
        });
        assert!(!built);
        assert!(mem.contents().is_empty());
    }

    #[test]
    fn test_set_level_round_trip() {
        let (mem, handle) = capture(vec![]);
        handle.set_level(Level::Debug);
        assert_eq!(handle.level(), Level::Debug);
        assert_eq!(handle.options().severity_floor, Some(Level::Debug));
        handle.debugf(format_args!("test show debug: {}", "debug msg"));

        handle.set_level(Level::Info);
        handle.debugf(format_args!("test non-show debug: {}", "debug msg"));

        let out = mem.contents();
        assert!(out.contains("test show debug"));
        assert!(!out.contains("test non-show debug"));
    }

    #[test]
    fn test_fields_on_adopted_backend() {
        let mem = MemoryWriter::new();
        let backend = Backend::new(mem.clone().into());
        let handle = Handle::new([crate::options::with_backend(backend)]).unwrap();
        let child = handle.fields(vec![json!("k"), json!("v")]).unwrap();
        child.info(&[&"child"]);
        handle.info(&[&"parent"]);
        let lines = mem.lines();
        assert!(lines[0].contains(r#""k":"v""#));
        assert!(!lines[1].contains(r#""k":"v""#));
        assert!(handle.fields(vec![json!("odd")]).is_err());
    }

    #[test]
    fn test_adopted_state_survives_rebuilds() {
        let mem = MemoryWriter::new();
        let backend = Backend::new(mem.clone().into());
        let handle = Handle::new([crate::options::with_backend(backend)]).unwrap();
        let child = handle.clone_with([with_level(Level::Warn)]).unwrap();
        assert!(child.state.load().adopted);
        handle.init(vec![with_level(Level::Error)]).unwrap();
        assert!(handle.state.load().adopted);
        assert!(handle.backend().writer().same_sink(child.backend().writer()));
    }
}
