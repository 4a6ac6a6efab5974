//! Leveled convenience macros over [`Logger`](crate::logger::Logger).
//!
//! # Feature Flags
//! Specific log levels are controlled by cargo features:
//! `log-trace`, `log-debug`, `log-info`, `log-warn`, `log-error`.
//!
//! If a feature is disabled, the corresponding macros expand to `()`,
//! removing all argument evaluation at compile time. With a feature enabled,
//! the runtime threshold still decides whether the record is emitted; the
//! debug and trace macros additionally check the threshold *before*
//! evaluating their key/value expressions, so a filtered call costs one
//! branch and nothing else.

// ============================================================================
// 1. GENERIC INTERNAL MACRO (The "Worker")
// ============================================================================
// Available so the enabled macros below can use it. Call the level macros
// instead if you want feature gating.

#[macro_export]
macro_rules! log_with {
    ($logger:expr, $lvl:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        $logger.log(
            $lvl,
            $msg,
            &[$(($crate::Key::from($key), $crate::Value::from($value))),*],
        );
    }};
}

// ============================================================================
// 2. LEVEL-SPECIFIC MACROS (Feature Gated)
// ============================================================================

// ---------------------- TRACE ----------------------
#[cfg(feature = "log-trace")]
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        if $logger.trace_enabled() {
            $crate::log_with!($logger, $crate::Level::Trace, $msg $(, $key => $value)*);
        }
    }};
}

#[cfg(not(feature = "log-trace"))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- DEBUG ----------------------
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        if $logger.debug_enabled() {
            $crate::log_with!($logger, $crate::Level::Debug, $msg $(, $key => $value)*);
        }
    }};
}

#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- INFO ----------------------
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        $crate::log_with!($logger, $crate::Level::Info, $msg $(, $key => $value)*);
    }};
}

#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- WARN ----------------------
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        $crate::log_with!($logger, $crate::Level::Warn, $msg $(, $key => $value)*);
    }};
}

#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- ERROR ----------------------
// Generally always enabled, but consistent structure allows opting out.
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        $crate::log_with!($logger, $crate::Level::Error, $msg $(, $key => $value)*);
    }};
}

#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        ()
    };
}
