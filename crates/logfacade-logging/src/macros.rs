//! Leveled emit macros
//!
//! Each macro takes `format!`-style arguments and emits through the active
//! logger, or through an explicit one with a leading `logger: &logger,`.
//! The macros expand at the call site, so the caller field names the line
//! that invoked them.
//!
//! ```
//! use logfacade_logging::{infof, warnf};
//!
//! infof!("listening on port {}", 8080);
//! warnf!("cache at {}% capacity", 93);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __emit {
    ($level:ident, logger: $logger:expr, $($arg:tt)+) => {
        $crate::Logger::in_scope($logger, || {
            $crate::__private::tracing::event!(
                target: $crate::TARGET,
                $crate::__private::tracing::Level::$level,
                $($arg)+
            )
        })
    };
    ($level:ident, $($arg:tt)+) => {
        $crate::with_current(|logger| $crate::__emit!($level, logger: logger, $($arg)+))
    };
}

/// Log at Debug level (blue)
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::__emit!(DEBUG, $($arg)+)
    };
}

/// Log at Info level (green)
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::__emit!(INFO, $($arg)+)
    };
}

/// Log at Warn level (magenta)
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::__emit!(WARN, $($arg)+)
    };
}

/// Log at Error level (red)
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::__emit!(ERROR, $($arg)+)
    };
}

/// Log at Fatal level, flush every sink, then abort the process
///
/// This never returns and cannot be caught: there is no unwinding, so
/// `catch_unwind` and drop handlers do not run.
#[macro_export]
macro_rules! fatalf {
    (logger: $logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = $logger;
        $crate::Logger::in_scope(logger, || {
            $crate::__private::tracing::event!(
                target: $crate::TARGET,
                $crate::__private::tracing::Level::ERROR,
                fatal = true,
                $($arg)+
            )
        });
        $crate::__private::abort_after_fatal(logger)
    }};
    ($($arg:tt)+) => {{
        let logger = $crate::current();
        $crate::fatalf!(logger: &logger, $($arg)+)
    }};
}
