use core::fmt;
use std::io;

/// Errors surfaced by the logging pipeline.
///
/// Level methods on [`Logger`](crate::logger::Logger) swallow these (logging
/// must never crash the host application) and count them via
/// `dropped_records()`; callers who need visibility use `try_log`.
#[derive(Debug)]
pub enum LogError {
    /// The level string given at construction time is not a known level.
    InvalidLevel(String),
    /// The generic fallback serializer could not encode a value.
    Encode(String),
    /// The underlying sink failed during a write or flush.
    Sink(io::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::InvalidLevel(s) => write!(f, "invalid level: {s}"),
            LogError::Encode(s) => write!(f, "value encoding failed: {s}"),
            LogError::Sink(e) => write!(f, "sink write failed: {e}"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Sink(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        LogError::Sink(e)
    }
}

impl From<serde_json::Error> for LogError {
    fn from(e: serde_json::Error) -> Self {
        LogError::Encode(e.to_string())
    }
}
