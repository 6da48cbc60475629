//! Swappable filesystem and standard stream handles.
//!
//! Everything that touches disk or the process streams goes through the
//! [`FileSystem`] and [`Streams`] traits, which are passed into the locator,
//! walker and loader as constructor dependencies:
//!
//! - [`OsFileSystem`] / [`ProcessStreams`] - the real thing
//! - [`MemoryFileSystem`] / [`MemoryStreams`] - in-memory doubles for tests
//!
//! # Example
//!
//! ```
//! use stencil::vfs::{FileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.add_file("/templates/hello.tmpl", "Hello");
//! assert_eq!(fs.read(Path::new("/templates/hello.tmpl")).unwrap(), b"Hello");
//! ```

pub mod memory;
pub mod os;
pub mod streams;

pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;
pub use streams::{MemoryStreams, ProcessStreams, SharedBuffer, Streams};

use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Permission bits used for created files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Permission bits reported where the platform has none.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Metadata needed by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Unix permission bits.
    pub mode: u32,
}

/// A single directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name within the parent directory, exactly as stored on disk.
    pub name: OsString,
    /// Whether the entry itself is a directory. Symlinks are never
    /// directories, whatever they point at.
    pub is_dir: bool,
}

/// Filesystem operations used by Stencil.
///
/// Implementations must be safe for concurrent read-only use.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Read a whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Open a file for writing, creating it if absent and truncating it if present.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    /// Stat a path.
    fn metadata(&self, path: &Path) -> io::Result<EntryMetadata>;

    /// List a directory. Order is stable between calls.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Create a directory and its ancestors with the given mode.
    ///
    /// Succeeds when the directory already exists.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Expand a glob pattern to the existing paths it matches.
    fn glob(&self, pattern: &str) -> io::Result<Vec<PathBuf>>;

    /// Directory that relative paths are resolved against.
    fn current_dir(&self) -> io::Result<PathBuf>;
}

/// Lexically normalize a path: drop `.` components and fold `..`.
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve `path` against the filesystem's current directory and clean it.
pub fn absolutize(fs: &dyn FileSystem, path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        Ok(clean(&fs.current_dir()?.join(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_cur_dir() {
        assert_eq!(clean(Path::new("./a/./b")), PathBuf::from("a/b"));
    }

    #[test]
    fn clean_folds_parent_dir() {
        assert_eq!(clean(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
    }

    #[test]
    fn clean_keeps_leading_parent_for_relative() {
        assert_eq!(clean(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn clean_does_not_escape_root() {
        assert_eq!(clean(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn clean_empty_is_dot() {
        assert_eq!(clean(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn clean_strips_trailing_slash() {
        assert_eq!(clean(Path::new("out/")), PathBuf::from("out"));
    }

    #[test]
    fn absolutize_uses_current_dir() {
        let fs = MemoryFileSystem::with_current_dir("/work");
        assert_eq!(
            absolutize(&fs, Path::new("in/../tpl")).unwrap(),
            PathBuf::from("/work/tpl")
        );
    }

    #[test]
    fn absolutize_keeps_absolute() {
        let fs = MemoryFileSystem::new();
        assert_eq!(
            absolutize(&fs, Path::new("/x/./y")).unwrap(),
            PathBuf::from("/x/y")
        );
    }
}
