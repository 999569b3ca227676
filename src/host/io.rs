//! Stream adapters for script sources and script output.

use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::host::error::ScriptError;

/// Reads a whole script source from `reader`.
pub fn read_source<R: Read>(mut reader: R) -> Result<String, ScriptError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    Ok(source)
}

/// An in-memory writer whose clones share one buffer, so a host can hand one clone to
/// a [`ScriptContext`](crate::host::bindings::ScriptContext) and read the output
/// through another.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
