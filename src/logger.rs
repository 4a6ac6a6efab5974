use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::caller::{BacktraceResolver, CallerResolver};
use crate::encoder::{encode_key, encode_value, write_fmt};
use crate::escaping_writer::EscapingWriter;
use crate::json_value::{Key, Value};
use crate::log_error::LogError;
use crate::log_level::Level;
use crate::log_time::LogTime;

/// A leveled JSON line logger.
///
/// Each record becomes one self-contained JSON object per line on the sink:
///
/// ```text
/// {"ts": "2022-02-01T13:01:02.123456Z", "level": "INFO", "message": "started", "port": 8080}
/// ```
///
/// Configuration (sink, threshold, name) is immutable after construction; the
/// only mutable shared state is the mutex around the sink, which serializes
/// concurrent callers so lines never interleave, and a diagnostic counter for
/// silently dropped records. Cloning and [`derive`](Self::derive) share the
/// sink, its mutex and the counter, so loggers derived from a common parent
/// still exclude each other on the wire.
///
/// Nothing allocated for a record outlives its emission call: the 1 KiB write
/// buffer lives on the stack of the logging thread.
pub struct Logger {
    sink: Arc<Mutex<dyn io::Write + Send>>,
    level: Level,
    debug_enabled: bool,
    trace_enabled: bool,
    name: Option<String>,
    caller: Option<Arc<dyn CallerResolver>>,
    dropped: Arc<AtomicU64>,
}

impl Clone for Logger {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            level: self.level,
            debug_enabled: self.debug_enabled,
            trace_enabled: self.trace_enabled,
            name: self.name.clone(),
            caller: self.caller.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }
}

impl Logger {
    /// Creates a logger writing to `sink` with the given threshold.
    ///
    /// The sink is wrapped in the logger's mutex; it does not need to be
    /// internally synchronized. `Error` and `Warn` records carry caller
    /// metadata resolved by the default [`BacktraceResolver`]; when symbols
    /// are unavailable those fields degrade to `<unknown>` rather than
    /// disappearing. The threshold gates only `Debug` and `Trace`; `Error`,
    /// `Warn` and `Info` records are always emitted.
    pub fn new<W>(level: Level, sink: W) -> Self
    where
        W: io::Write + Send + 'static,
    {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            level,
            debug_enabled: level >= Level::Debug,
            trace_enabled: level >= Level::Trace,
            name: None,
            caller: Some(Arc::new(BacktraceResolver)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a logger from a level name such as `"info"` or `"DEBUG"`.
    ///
    /// # Errors
    /// Returns [`LogError::InvalidLevel`] for an unknown level name. An
    /// invalid configured level is a hard failure, never a silent default.
    pub fn with_level_str<W>(level: &str, sink: W) -> Result<Self, LogError>
    where
        W: io::Write + Send + 'static,
    {
        Ok(Self::new(level.parse()?, sink))
    }

    /// Returns a logger named `suffix`, or `parent.suffix` when this logger
    /// is already named.
    ///
    /// Pure value construction: the parent is untouched, so deriving and
    /// logging on the same parent from different threads never race. The
    /// derived logger shares the parent's sink and mutex.
    #[must_use]
    pub fn derive(&self, suffix: &str) -> Self {
        let name = match &self.name {
            Some(parent) => format!("{parent}.{suffix}"),
            None => suffix.to_owned(),
        };
        let mut derived = self.clone();
        derived.name = Some(name);
        derived
    }

    /// Replaces the caller resolver used for `Error`/`Warn` records.
    #[must_use]
    pub fn with_caller_resolver(mut self, resolver: Arc<dyn CallerResolver>) -> Self {
        self.caller = Some(resolver);
        self
    }

    /// Disables caller metadata entirely.
    #[must_use]
    pub fn without_caller_info(mut self) -> Self {
        self.caller = None;
        self
    }

    /// The configured threshold.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The logger's name, if derived.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True if `Debug` records are emitted.
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// True if `Trace` records are emitted.
    #[must_use]
    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    /// Number of records dropped because emission failed. Logging never
    /// propagates failures into the host application; this counter is the
    /// opt-in diagnostic for operators who need to notice a broken sink.
    #[must_use]
    pub fn dropped_records(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Emits an `Error` record.
    pub fn error(&self, msg: &str, fields: &[(Key<'_>, Value<'_>)]) {
        self.log(Level::Error, msg, fields);
    }

    /// Emits a `Warn` record.
    pub fn warn(&self, msg: &str, fields: &[(Key<'_>, Value<'_>)]) {
        self.log(Level::Warn, msg, fields);
    }

    /// Emits an `Info` record.
    pub fn info(&self, msg: &str, fields: &[(Key<'_>, Value<'_>)]) {
        self.log(Level::Info, msg, fields);
    }

    /// Emits a `Debug` record if the threshold enables it.
    pub fn debug(&self, msg: &str, fields: &[(Key<'_>, Value<'_>)]) {
        self.log(Level::Debug, msg, fields);
    }

    /// Emits a `Trace` record if the threshold enables it.
    pub fn trace(&self, msg: &str, fields: &[(Key<'_>, Value<'_>)]) {
        self.log(Level::Trace, msg, fields);
    }

    /// Emits a record at `level`, swallowing any failure.
    ///
    /// A failed emission increments [`dropped_records`](Self::dropped_records)
    /// instead of surfacing; use [`try_log`](Self::try_log) for visibility.
    pub fn log(&self, level: Level, msg: &str, fields: &[(Key<'_>, Value<'_>)]) {
        if !level.enabled_at(self.level) {
            return;
        }
        if self.try_log(level, msg, fields).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Emits a record at `level`, surfacing emission failures.
    ///
    /// A filtered-out level returns `Ok(())` without taking the lock or
    /// touching the sink. On failure the remainder of the record is
    /// abandoned; bytes already flushed to the sink stand (accepted
    /// partial-write risk under device failure). There is no retry.
    ///
    /// # Errors
    /// [`LogError::Sink`] if the sink fails, [`LogError::Encode`] if a
    /// fallback value cannot be serialized.
    pub fn try_log(
        &self,
        level: Level,
        msg: &str,
        fields: &[(Key<'_>, Value<'_>)],
    ) -> Result<(), LogError> {
        if !level.enabled_at(self.level) {
            return Ok(());
        }

        // Stack walking is comparatively expensive; do it before taking the
        // lock so contending threads are not serialized behind it.
        let caller = match (level, &self.caller) {
            (Level::Error | Level::Warn, Some(resolver)) => resolver.resolve(),
            _ => None,
        };

        let mut guard = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let ts = LogTime::now();
        let mut w = EscapingWriter::new(&mut *guard);

        w.write_raw(b"{\"ts\": \"")?;
        w.write_raw(ts.as_bytes())?;
        w.write_raw(b"\", \"level\": ")?;
        w.write_json_string(level.as_str())?;
        if let Some(name) = &self.name {
            w.write_raw(b", \"logger\": ")?;
            w.write_json_string(name)?;
        }
        w.write_raw(b", \"message\": ")?;
        w.write_json_string(msg)?;

        for (key, value) in fields {
            w.write_raw(b", ")?;
            encode_key(&mut w, key)?;
            w.write_raw(b": ")?;
            encode_value(&mut w, value)?;
        }

        if let Some(c) = &caller {
            w.write_raw(b", \"caller_func\": ")?;
            w.write_json_string(&c.function)?;
            w.write_raw(b", \"caller_file\": \"")?;
            w.write_escaped(&c.file)?;
            write_fmt(&mut w, false, format_args!(":{}", c.line))?;
            w.write_raw(b"\"")?;
        }

        w.write_raw(b"}\n")?;
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::caller::CallerInfo;

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FixedCaller;

    impl CallerResolver for FixedCaller {
        fn resolve(&self) -> Option<CallerInfo> {
            Some(CallerInfo {
                function: "app::handler".to_owned(),
                file: "src/handler.rs".to_owned(),
                line: 17,
            })
        }
    }

    fn logger_at(level: Level) -> (Logger, SharedSink) {
        let sink = SharedSink::default();
        let logger = Logger::new(level, sink.clone()).without_caller_info();
        (logger, sink)
    }

    #[test]
    fn envelope_fields_come_in_documented_order() {
        let (logger, sink) = logger_at(Level::Info);
        logger.info("Test msg", &[(Key::from("Key1"), Value::from("Value1"))]);

        let line = sink.contents();
        assert!(line.starts_with("{\"ts\": \""), "line: {line}");
        let after_ts = &line[line.find("\", \"level\"").unwrap()..];
        assert!(
            after_ts.starts_with("\", \"level\": \"INFO\", \"message\": \"Test msg\", \"Key1\": \"Value1\"}\n"),
            "line: {line}"
        );

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "Test msg");
        assert_eq!(parsed["Key1"], "Value1");
        assert_eq!(parsed["ts"].as_str().unwrap().len(), 27);
    }

    #[test]
    fn named_logger_inserts_logger_field_between_level_and_message() {
        let (logger, sink) = logger_at(Level::Info);
        logger.derive("net").info("up", &[]);

        let line = sink.contents();
        assert!(
            line.contains("\"level\": \"INFO\", \"logger\": \"net\", \"message\": \"up\""),
            "line: {line}"
        );
    }

    #[test]
    fn derive_composes_names_and_leaves_parent_untouched() {
        let (parent, _sink) = logger_at(Level::Info);
        let child = parent.derive("ice");
        let grandchild = child.derive("stun");

        assert_eq!(parent.name(), None);
        assert_eq!(child.name(), Some("ice"));
        assert_eq!(grandchild.name(), Some("ice.stun"));
    }

    #[test]
    fn info_and_warn_are_emitted_under_an_error_threshold() {
        let (logger, sink) = logger_at(Level::Error);
        logger.info("must appear", &[]);
        logger.warn("also appears", &[]);
        logger.error("too", &[]);
        logger.debug("hidden", &[]);
        logger.trace("hidden", &[]);

        let all = sink.contents();
        assert_eq!(all.lines().count(), 3, "output: {all}");
        assert!(all.contains("must appear"));
        assert!(all.contains("also appears"));
    }

    #[test]
    fn filtered_levels_produce_zero_bytes() {
        let (logger, sink) = logger_at(Level::Info);
        logger.debug("hidden", &[]);
        logger.trace("hidden", &[]);
        assert!(sink.contents().is_empty());
        assert_eq!(logger.dropped_records(), 0);
    }

    #[test]
    fn threshold_queries_reflect_configuration() {
        let (info, _) = logger_at(Level::Info);
        assert_eq!(info.level(), Level::Info);
        assert!(!info.debug_enabled());
        assert!(!info.trace_enabled());

        let (trace, _) = logger_at(Level::Trace);
        assert!(trace.debug_enabled());
        assert!(trace.trace_enabled());
    }

    #[test]
    fn invalid_level_string_fails_construction() {
        let sink = SharedSink::default();
        match Logger::with_level_str("loud", sink) {
            Err(LogError::InvalidLevel(s)) => assert_eq!(s, "loud"),
            other => panic!("expected InvalidLevel, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn level_str_construction_accepts_any_case() {
        let sink = SharedSink::default();
        let logger = Logger::with_level_str("dEbUg", sink).unwrap();
        assert_eq!(logger.level(), Level::Debug);
    }

    #[test]
    fn duplicate_keys_are_preserved_in_call_order() {
        let (logger, sink) = logger_at(Level::Info);
        logger.info(
            "dup",
            &[
                (Key::from("k"), Value::from(1)),
                (Key::from("k"), Value::from(2)),
            ],
        );
        let line = sink.contents();
        assert!(line.contains("\"k\": 1, \"k\": 2"), "line: {line}");
    }

    #[test]
    fn error_and_warn_records_carry_caller_metadata() {
        let sink = SharedSink::default();
        let logger = Logger::new(Level::Info, sink.clone())
            .with_caller_resolver(Arc::new(FixedCaller));

        logger.error("boom", &[]);
        logger.warn("careful", &[]);
        logger.info("calm", &[]);

        let all = sink.contents();
        let lines: Vec<&str> = all.lines().collect();
        assert!(lines[0].contains("\"caller_func\": \"app::handler\""));
        assert!(lines[0].contains("\"caller_file\": \"src/handler.rs:17\""));
        assert!(lines[1].contains("\"caller_func\""));
        assert!(!lines[2].contains("caller_func"));
    }

    struct BrokenSink;

    impl io::Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk detached"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_is_swallowed_but_counted() {
        let logger = Logger::new(Level::Info, BrokenSink).without_caller_info();
        logger.info("lost", &[]);
        logger.info("also lost", &[]);
        assert_eq!(logger.dropped_records(), 2);

        match logger.try_log(Level::Info, "explicit", &[]) {
            Err(LogError::Sink(_)) => {}
            other => panic!("expected Sink error, got {other:?}"),
        }
    }

    #[test]
    fn encode_failure_aborts_only_that_record() {
        let (logger, sink) = logger_at(Level::Info);
        // A map with non-string keys is representable as a serde_json tree
        // only after to_value, which rejects it.
        let bad = std::collections::HashMap::from([(vec![1u8], "x")]);
        assert!(Value::json(&bad).is_err());
        // The logger keeps working afterwards.
        logger.info("still alive", &[]);
        assert!(sink.contents().contains("still alive"));
    }

    #[test]
    fn clones_share_sink_and_drop_counter() {
        let (logger, sink) = logger_at(Level::Info);
        let clone = logger.clone();
        logger.info("one", &[]);
        clone.info("two", &[]);
        let all = sink.contents();
        assert_eq!(all.lines().count(), 2);
    }
}
