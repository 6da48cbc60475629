//! Reading template sources and opening destinations.

use crate::error::{Result, StencilError};
use crate::vfs::{FileSystem, Streams};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Identifier that binds to standard input or standard output.
pub const STDIO: &str = "-";

/// Reads sources and opens destinations through injected handles.
///
/// The identifier [`STDIO`] bypasses the filesystem and binds to the
/// process streams; anything else is a path on the [`FileSystem`].
#[derive(Debug, Clone)]
pub struct ContentLoader {
    fs: Arc<dyn FileSystem>,
    streams: Arc<dyn Streams>,
}

impl ContentLoader {
    /// Create a loader over the given filesystem and streams.
    pub fn new(fs: Arc<dyn FileSystem>, streams: Arc<dyn Streams>) -> Self {
        Self { fs, streams }
    }

    /// Read the full contents of a source.
    pub fn read_input(&self, id: &str) -> Result<String> {
        let read_error = |source: std::io::Error| StencilError::Read {
            path: id.to_string(),
            source,
        };

        let bytes = if id == STDIO {
            let mut buf = Vec::new();
            self.streams
                .stdin()
                .read_to_end(&mut buf)
                .map_err(read_error)?;
            buf
        } else {
            self.fs.read(Path::new(id)).map_err(read_error)?
        };

        String::from_utf8(bytes).map_err(|e| StencilError::Read {
            path: id.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    /// Check that a destination could be opened, without creating or
    /// truncating it: its parent must be an existing directory.
    pub fn check_output(&self, id: &str) -> Result<()> {
        if id == STDIO {
            return Ok(());
        }

        let write_error = |source: std::io::Error| StencilError::Write {
            path: id.to_string(),
            source,
        };
        let parent = match Path::new(id).parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let meta = self.fs.metadata(parent).map_err(write_error)?;
        if !meta.is_dir {
            return Err(write_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", parent.display()),
            )));
        }
        Ok(())
    }

    /// Open a destination for writing.
    ///
    /// Files are created if absent and truncated if present.
    pub fn open_output(&self, id: &str) -> Result<Box<dyn Write + Send>> {
        if id == STDIO {
            return Ok(self.streams.stdout());
        }

        self.fs
            .create(Path::new(id))
            .map_err(|source| StencilError::Write {
                path: id.to_string(),
                source,
            })
    }
}
