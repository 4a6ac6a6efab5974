use std::io;

use crate::log_error::LogError;

/// Capacity of the per-call write buffer, in bytes.
pub const BUF_SIZE: usize = 1024;

/// JSON escape sequences for the 32 control bytes, indexed by byte value.
///
/// `\t`, `\n` and `\r` get their short forms; everything else renders as
/// `\u00XX` with lowercase hex.
const CONTROL_ESCAPES: [&[u8]; 32] = [
    b"\\u0000", b"\\u0001", b"\\u0002", b"\\u0003", b"\\u0004", b"\\u0005", b"\\u0006", b"\\u0007",
    b"\\u0008", b"\\t", b"\\n", b"\\u000b", b"\\u000c", b"\\r", b"\\u000e", b"\\u000f",
    b"\\u0010", b"\\u0011", b"\\u0012", b"\\u0013", b"\\u0014", b"\\u0015", b"\\u0016", b"\\u0017",
    b"\\u0018", b"\\u0019", b"\\u001a", b"\\u001b", b"\\u001c", b"\\u001d", b"\\u001e", b"\\u001f",
];

/// True for the bytes that cannot appear verbatim inside a JSON string.
#[inline]
const fn needs_escape(b: u8) -> bool {
    b < 0x20 || b == b'"' || b == b'\\'
}

/// The replacement sequence for one JSON-unsafe byte.
#[inline]
fn escape_sequence(b: u8) -> &'static [u8] {
    match b {
        b'"' => b"\\\"",
        b'\\' => b"\\\\",
        _ => CONTROL_ESCAPES[b as usize],
    }
}

/// Fixed-capacity buffered writer over a borrowed sink, with JSON string
/// escaping done in place.
///
/// One `EscapingWriter` is constructed on the stack for each emitted record
/// and discarded when the record is done; the buffer is a single fixed block
/// reused across flush cycles, so no operation here allocates regardless of
/// input size. Inputs larger than [`BUF_SIZE`] are split: fill to capacity,
/// flush, continue into the emptied buffer.
pub struct EscapingWriter<'a> {
    sink: &'a mut dyn io::Write,
    buf: [u8; BUF_SIZE],
    len: usize,
}

impl<'a> EscapingWriter<'a> {
    /// Creates an empty writer bound to `sink`. Nothing is written until the
    /// buffer fills or [`flush`](Self::flush) is called.
    pub fn new(sink: &'a mut dyn io::Write) -> Self {
        Self {
            sink,
            buf: [0; BUF_SIZE],
            len: 0,
        }
    }

    /// Appends `bytes` verbatim, flushing to the sink whenever the buffer
    /// fills.
    ///
    /// Returns the number of bytes accepted, which equals `bytes.len()` on
    /// success.
    ///
    /// # Errors
    /// Returns [`LogError::Sink`] if a forced flush fails. Bytes already
    /// flushed stand; the remainder of the record is abandoned by the caller.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<usize, LogError> {
        let mut rest = bytes;
        loop {
            let free = BUF_SIZE - self.len;
            if rest.len() <= free {
                self.buf[self.len..self.len + rest.len()].copy_from_slice(rest);
                self.len += rest.len();
                return Ok(bytes.len());
            }
            self.buf[self.len..].copy_from_slice(&rest[..free]);
            self.len = BUF_SIZE;
            self.flush()?;
            rest = &rest[free..];
        }
    }

    /// Writes `s` with JSON string escaping applied: control bytes
    /// `0x00..=0x1f`, `"` and `\` are replaced by their escape sequences,
    /// everything else passes through untouched.
    ///
    /// The scan keeps a copy-from cursor and forwards each maximal unescaped
    /// run in a single [`write_raw`](Self::write_raw) call, so the number of
    /// buffer appends is proportional to the number of escaped bytes, not the
    /// input length. Multi-byte UTF-8 sequences are never escapable (all
    /// their bytes are >= 0x80) and pass through as-is.
    ///
    /// Returns the number of bytes emitted.
    ///
    /// # Errors
    /// Returns [`LogError::Sink`] if a forced flush fails mid-scan.
    pub fn write_escaped(&mut self, s: &str) -> Result<usize, LogError> {
        let bytes = s.as_bytes();
        let mut written = 0;
        let mut copy_from = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if !needs_escape(b) {
                continue;
            }
            if copy_from < i {
                written += self.write_raw(&bytes[copy_from..i])?;
            }
            written += self.write_raw(escape_sequence(b))?;
            copy_from = i + 1;
        }
        if copy_from < bytes.len() {
            written += self.write_raw(&bytes[copy_from..])?;
        }
        Ok(written)
    }

    /// Writes `s` as a complete JSON string: opening quote, escaped content,
    /// closing quote. Returns the byte count including both quotes.
    ///
    /// # Errors
    /// Returns [`LogError::Sink`] if a forced flush fails.
    pub fn write_json_string(&mut self, s: &str) -> Result<usize, LogError> {
        let mut written = self.write_raw(b"\"")?;
        written += self.write_escaped(s)?;
        written += self.write_raw(b"\"")?;
        Ok(written)
    }

    /// Sends the valid buffer prefix to the sink and resets the cursor.
    ///
    /// The cursor is reset before the result is known: bytes handed to the
    /// sink are considered sent even when the sink reports a failure, so the
    /// buffer never retains data that may already be on the wire.
    ///
    /// # Errors
    /// Returns [`LogError::Sink`] with the underlying error on failure.
    pub fn flush(&mut self) -> Result<(), LogError> {
        if self.len == 0 {
            return Ok(());
        }
        let pending = self.len;
        self.len = 0;
        self.sink.write_all(&self.buf[..pending])?;
        Ok(())
    }
}

/// Raw (unescaped) `io::Write` access, used by the generic fallback
/// serializer to stream already-valid JSON through the same buffer.
impl io::Write for EscapingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_raw(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        EscapingWriter::flush(self).map_err(io::Error::other)
    }
}
