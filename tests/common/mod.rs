#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

/// An in-memory sink that stays readable after the logger takes ownership of
/// its clone.
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn byte_len(&self) -> usize {
        self.0.lock().unwrap().len()
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
