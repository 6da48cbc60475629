//! Standard input/output handles.
//!
//! The identifier `-` binds to these streams instead of the filesystem.

use std::fmt;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};

/// Source of the process's standard streams.
pub trait Streams: Send + Sync + fmt::Debug {
    /// A reader over standard input.
    fn stdin(&self) -> Box<dyn Read + Send>;

    /// A writer to standard output.
    fn stdout(&self) -> Box<dyn Write + Send>;
}

/// The real process streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessStreams;

impl Streams for ProcessStreams {
    fn stdin(&self) -> Box<dyn Read + Send> {
        Box::new(io::stdin())
    }

    fn stdout(&self) -> Box<dyn Write + Send> {
        Box::new(io::stdout())
    }
}

/// A cloneable byte buffer usable as a writer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8 (lossy).
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory streams for tests.
///
/// # Example
///
/// ```
/// use stencil::vfs::{MemoryStreams, Streams};
/// use std::io::{Read, Write};
///
/// let streams = MemoryStreams::with_stdin("piped input");
/// let mut input = String::new();
/// streams.stdin().read_to_string(&mut input).unwrap();
/// assert_eq!(input, "piped input");
///
/// streams.stdout().write_all(b"done").unwrap();
/// assert_eq!(streams.output(), "done");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStreams {
    stdin: Vec<u8>,
    stdout: SharedBuffer,
}

impl MemoryStreams {
    /// Streams with empty standard input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams whose standard input yields `input`.
    pub fn with_stdin(input: impl Into<Vec<u8>>) -> Self {
        Self {
            stdin: input.into(),
            stdout: SharedBuffer::new(),
        }
    }

    /// Everything written to standard output so far.
    pub fn output(&self) -> String {
        self.stdout.contents()
    }
}

impl Streams for MemoryStreams {
    fn stdin(&self) -> Box<dyn Read + Send> {
        Box::new(Cursor::new(self.stdin.clone()))
    }

    fn stdout(&self) -> Box<dyn Write + Send> {
        Box::new(self.stdout.clone())
    }
}
