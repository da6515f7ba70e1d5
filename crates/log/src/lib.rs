//! # switchlog
//!
//! A structured logger behind a pluggable [`Logger`] interface.
//!
//! Configuration is declarative: option functions are resolved into a
//! [`Configuration`], which [`LoggerBuilder`] turns into a backend instance
//! wrapped by a [`Handle`].
//!
//! - **Production** mode writes one JSON object per record.
//! - **Development** mode writes colored, human readable lines.
//! - Seed fields, hooks and caller reporting decorate every record.
//! - Fatal records call an injectable exit function.
//!
//! ```rust
//! use switchlog::prelude::*;
//! use switchlog::options::{with_output, with_level};
//!
//! let sink = MemoryWriter::new();
//! let logger = Handle::new([with_output(sink.clone()), with_level(Level::Debug)])?;
//! switchlog::infof!(logger, "test logger name: {}", "name");
//!
//! let scoped = logger.fields(vec!["request_id".into(), "r-1".into()])?;
//! scoped.warn(&[&"slow request"]);
//!
//! assert!(sink.contents().contains("test logger name"));
//! # Ok::<(), switchlog::LogError>(())
//! ```

pub mod backend;
pub mod builder;
pub mod config;
pub mod core;
pub mod default;
pub mod format;
pub mod layer;
pub mod level;
pub mod options;

mod handle;
mod logger;
mod macros;

pub use backend::{Backend, Hook, HookFn, MemoryWriter, Record, Severity, SharedWriter};
pub use builder::LoggerBuilder;
pub use config::{Configuration, ExitFn, Mode};
pub use crate::core::{LogError, LogResult};
pub use handle::Handle;
pub use layer::BridgeLayer;
pub use level::{Level, parse_level};
pub use logger::Logger;
pub use options::{LogOption, Options, Overrides, resolve};

/// Field name under which attached errors are rendered
pub const ERROR_FIELD_NAME: &str = "error";

/// Field name under which a rendered error stack appears
pub const STACK_FIELD_NAME: &str = "stack";

/// Common imports
pub mod prelude {
    pub use crate::{
        Configuration, Handle, Hook, HookFn, Level, LogError, LogOption, LogResult, Logger,
        MemoryWriter, Mode, Record, Severity, SharedWriter,
    };
}
