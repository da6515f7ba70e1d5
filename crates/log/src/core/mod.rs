//! Core error and result types

mod error;

pub use error::{LogError, LogResult};
