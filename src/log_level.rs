use std::str::FromStr;

use crate::log_error::LogError;

/// Defines the severity levels for log records.
///
/// Declaration order is significance order: `Error` is the most severe.
/// `Error`, `Warn` and `Info` records are always emitted; a logger's
/// threshold only decides whether `Debug` and `Trace` join them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Designates error events that might still allow the application to continue running.
    Error,
    /// Designates potentially harmful situations.
    Warn,
    /// Designates informational messages that highlight the progress of the application.
    Info,
    /// Designates fine-grained informational events that are most useful to debug an application.
    Debug,
    /// Designates very fine-grained informational events, e.g. payload dumps.
    Trace,
}

impl Level {
    /// The wire name of the level, exactly as it appears in the JSON envelope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    /// True when a record at `self` passes a logger thresholded at
    /// `threshold`. `Error`, `Warn` and `Info` pass unconditionally; the
    /// threshold gates only `Debug` and `Trace`.
    #[must_use]
    pub const fn enabled_at(self, threshold: Level) -> bool {
        self as u8 <= Level::Info as u8 || self as u8 <= threshold as u8
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    /// Parses a level name case-insensitively.
    ///
    /// # Errors
    /// Returns [`LogError::InvalidLevel`] for anything that is not one of
    /// `ERROR`, `WARN`, `INFO`, `DEBUG`, `TRACE`. An invalid level is a
    /// configuration error and must fail construction rather than silently
    /// default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Level; 5] = [
            Level::Error,
            Level::Warn,
            Level::Info,
            Level::Debug,
            Level::Trace,
        ];
        ALL.into_iter()
            .find(|lvl| lvl.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LogError::InvalidLevel(s.to_owned()))
    }
}
