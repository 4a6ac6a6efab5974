//! jsonlog is an embeddable structured-logging library.
//!
//! Callers emit leveled, key/value log records; the library serializes each
//! record as one self-contained JSON object per line to an arbitrary
//! `io::Write` sink. The emission path is built around a fixed-capacity
//! stack buffer and performs no heap allocation for records made of strings
//! and scalar values, regardless of payload size.
//!
//! ```no_run
//! use jsonlog::{Level, Logger, log_info};
//!
//! let logger = Logger::new(Level::Info, std::io::stdout());
//! log_info!(logger, "listener up", "port" => 8080, "tls" => true);
//!
//! let ice = logger.derive("ice");
//! ice.warn("candidate timed out", &[("peer".into(), "10.0.0.7".into())]);
//! ```

/// Call-site resolution for `Error`/`Warn` records.
pub mod caller;
/// Key and value dispatch onto the escaping writer.
pub mod encoder;
/// Fixed-capacity buffered writer with in-place JSON escaping.
pub mod escaping_writer;
/// Typed record keys and values.
pub mod json_value;
/// Error taxonomy of the emission pipeline.
pub mod log_error;
/// Severity levels and threshold parsing.
pub mod log_level;
/// Leveled, feature-gated logging macros.
pub mod log_macros;
/// Allocation-free RFC3339 timestamp rendering.
pub mod log_time;
/// The record emitter.
pub mod logger;

pub use caller::{BacktraceResolver, CallerInfo, CallerResolver};
pub use escaping_writer::{BUF_SIZE, EscapingWriter};
pub use json_value::{JsonWritable, Key, Value};
pub use log_error::LogError;
pub use log_level::Level;
pub use log_time::{LOG_TIME_LEN, LogTime};
pub use logger::Logger;
