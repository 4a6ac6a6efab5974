use core::fmt;
use std::io;

use crate::escaping_writer::EscapingWriter;
use crate::json_value::{Key, Value};
use crate::log_error::LogError;

/// Bridges `core::fmt` formatting machinery onto an [`EscapingWriter`].
///
/// Integer and float `Display` impls format through stack buffers, so
/// rendering scalars this way stays allocation-free. `fmt::Error` carries no
/// payload; the real error is parked in `err` and recovered by the caller.
struct FmtAdapter<'w, 'a> {
    w: &'w mut EscapingWriter<'a>,
    escape: bool,
    written: usize,
    err: Option<LogError>,
}

impl fmt::Write for FmtAdapter<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let res = if self.escape {
            self.w.write_escaped(s)
        } else {
            self.w.write_raw(s.as_bytes())
        };
        match res {
            Ok(n) => {
                self.written += n;
                Ok(())
            }
            Err(e) => {
                self.err = Some(e);
                Err(fmt::Error)
            }
        }
    }
}

/// Renders `args` into the writer, raw or escaped, returning bytes emitted.
pub(crate) fn write_fmt(
    w: &mut EscapingWriter<'_>,
    escape: bool,
    args: fmt::Arguments<'_>,
) -> Result<usize, LogError> {
    let mut adapter = FmtAdapter {
        w,
        escape,
        written: 0,
        err: None,
    };
    match fmt::write(&mut adapter, args) {
        Ok(()) => Ok(adapter.written),
        Err(_) => Err(adapter
            .err
            .unwrap_or_else(|| LogError::Encode("formatting failed".to_owned()))),
    }
}

/// Counts bytes the generic serializer streams through the writer.
struct CountingSink<'w, 'a> {
    w: &'w mut EscapingWriter<'a>,
    written: usize,
}

impl io::Write for CountingSink<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.w.write_raw(buf).map_err(io::Error::other)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one record value as JSON, dispatching on the [`Value`] variant.
///
/// Every arm except [`Value::Json`] is allocation-free. Returns the bytes
/// emitted.
///
/// # Errors
/// [`LogError::Sink`] on sink failure; [`LogError::Encode`] when the generic
/// fallback serializer rejects the value.
pub fn encode_value(w: &mut EscapingWriter<'_>, value: &Value<'_>) -> Result<usize, LogError> {
    match value {
        Value::Str(s) => w.write_json_string(s),
        Value::I64(v) => write_fmt(w, false, format_args!("{v}")),
        Value::U64(v) => write_fmt(w, false, format_args!("{v}")),
        Value::F32(v) => write_fmt(w, false, format_args!("{v:.6}")),
        Value::F64(v) => write_fmt(w, false, format_args!("{v:.6}")),
        Value::Bool(v) => w.write_raw(if *v { b"true" } else { b"false" }),
        Value::Null => w.write_raw(b"null"),
        Value::Display(v) => {
            let mut n = w.write_raw(b"\"")?;
            n += write_fmt(w, true, format_args!("{v}"))?;
            n += w.write_raw(b"\"")?;
            Ok(n)
        }
        Value::Writable(v) => v.write_json(w),
        Value::Json(v) => {
            let mut counter = CountingSink { w, written: 0 };
            match serde_json::to_writer(&mut counter, v) {
                Ok(()) => Ok(counter.written),
                Err(e) if e.is_io() => Err(LogError::Sink(io::Error::other(e.to_string()))),
                Err(e) => Err(LogError::Encode(e.to_string())),
            }
        }
    }
}

/// Writes one record key as a quoted JSON string.
///
/// Non-string keys come out as `"INVALID_KEY_<value>"` so the line stays
/// valid JSON and the malformed call site is visible in the output.
///
/// # Errors
/// [`LogError::Sink`] on sink failure.
pub fn encode_key(w: &mut EscapingWriter<'_>, key: &Key<'_>) -> Result<usize, LogError> {
    match key {
        Key::Str(s) => w.write_json_string(s),
        Key::Display(k) => {
            let mut n = w.write_raw(b"\"")?;
            n += write_fmt(w, true, format_args!("{k}"))?;
            n += w.write_raw(b"\"")?;
            Ok(n)
        }
        Key::Invalid(k) => {
            let mut n = w.write_raw(b"\"INVALID_KEY_")?;
            n += write_fmt(w, true, format_args!("{k:?}"))?;
            n += w.write_raw(b"\"")?;
            Ok(n)
        }
    }
}
