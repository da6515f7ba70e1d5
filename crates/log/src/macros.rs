//! Convenience macros for formatted logging

/// Log a formatted message at an explicit level
///
/// ```rust,ignore
/// logf!(logger, Level::Warn, "retrying in {}s", delay);
/// ```
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        {
            use $crate::Logger as _;
            $logger.logf($level, ::std::format_args!($($arg)+))
        }
    };
}

/// Log a formatted message at trace level
#[macro_export]
macro_rules! tracef {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log a formatted message at debug level
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log a formatted message at info level
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a formatted message at warn level
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log a formatted message at error level
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a formatted message at fatal level, then call the exit function
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::Level::Fatal, $($arg)+)
    };
}
