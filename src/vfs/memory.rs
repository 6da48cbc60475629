//! In-memory filesystem for tests.

use super::{clean, DirEntry, EntryMetadata, FileSystem, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir { mode: u32 },
}

type Tree = BTreeMap<PathBuf, Node>;

/// A filesystem held entirely in memory.
///
/// Clones share the same tree, so a test can keep a handle for assertions
/// after passing another into the code under test.
///
/// # Example
///
/// ```
/// use stencil::vfs::{FileSystem, MemoryFileSystem};
/// use std::io::Write;
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.add_dir("/out", 0o755);
/// let mut out = fs.create(Path::new("/out/result.txt")).unwrap();
/// out.write_all(b"rendered").unwrap();
/// assert_eq!(fs.contents("/out/result.txt").as_deref(), Some("rendered"));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<Mutex<Tree>>,
    cwd: PathBuf,
}

impl MemoryFileSystem {
    /// Create an empty filesystem rooted at `/`, with `/` as current directory.
    pub fn new() -> Self {
        Self::with_current_dir("/")
    }

    /// Create an empty filesystem with the given current directory.
    ///
    /// The current directory and its ancestors are created.
    pub fn with_current_dir(cwd: impl AsRef<Path>) -> Self {
        let mut tree = Tree::new();
        tree.insert(PathBuf::from("/"), Node::Dir {
            mode: DEFAULT_DIR_MODE,
        });
        let fs = Self {
            tree: Arc::new(Mutex::new(tree)),
            cwd: clean(&Path::new("/").join(cwd.as_ref())),
        };
        fs.add_dir(fs.cwd.clone(), DEFAULT_DIR_MODE);
        fs
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        clean(&self.cwd.join(path))
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        // A panic while holding the lock cannot leave the tree half-updated
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a file (and any missing parent directories).
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = self.resolve(path.as_ref());
        let mut tree = self.lock();
        if let Some(parent) = path.parent() {
            insert_dirs(&mut tree, parent, DEFAULT_DIR_MODE);
        }
        tree.insert(path, Node::File(contents.as_ref().to_vec()));
    }

    /// Add a directory (and any missing parents) with the given mode.
    pub fn add_dir(&self, path: impl AsRef<Path>, mode: u32) {
        let path = self.resolve(path.as_ref());
        insert_dirs(&mut self.lock(), &path, mode);
    }

    /// Read a file back as UTF-8, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.resolve(path.as_ref());
        match self.lock().get(&path) {
            Some(Node::File(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// Whether anything exists at the path.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let path = self.resolve(path.as_ref());
        self.lock().contains_key(&path)
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_dirs(tree: &mut Tree, path: &Path, mode: u32) {
    for ancestor in path.ancestors().collect::<Vec<_>>().into_iter().rev() {
        tree.entry(ancestor.to_path_buf())
            .or_insert(Node::Dir { mode });
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

/// Writer appending into a file node of a [`MemoryFileSystem`].
struct MemoryFile {
    tree: Arc<Mutex<Tree>>,
    path: PathBuf,
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut tree = self.tree.lock().unwrap_or_else(|e| e.into_inner());
        match tree.get_mut(&self.path) {
            Some(Node::File(bytes)) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let abs = self.resolve(path);
        match self.lock().get(&abs) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        let abs = self.resolve(path);
        let mut tree = self.lock();

        let parent_is_dir = abs
            .parent()
            .map(|p| matches!(tree.get(p), Some(Node::Dir { .. })))
            .unwrap_or(false);
        if !parent_is_dir {
            return Err(not_found(path));
        }
        if let Some(Node::Dir { .. }) = tree.get(&abs) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            ));
        }

        tree.insert(abs.clone(), Node::File(Vec::new()));
        Ok(Box::new(MemoryFile {
            tree: Arc::clone(&self.tree),
            path: abs,
        }))
    }

    fn metadata(&self, path: &Path) -> io::Result<EntryMetadata> {
        let abs = self.resolve(path);
        match self.lock().get(&abs) {
            Some(Node::File(_)) => Ok(EntryMetadata {
                is_dir: false,
                mode: DEFAULT_FILE_MODE,
            }),
            Some(Node::Dir { mode }) => Ok(EntryMetadata {
                is_dir: true,
                mode: *mode,
            }),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let abs = self.resolve(path);
        let tree = self.lock();
        match tree.get(&abs) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{}: not a directory", path.display()),
                ))
            }
            None => return Err(not_found(path)),
        }

        Ok(tree
            .iter()
            .filter(|(p, _)| p.parent() == Some(abs.as_path()))
            .filter_map(|(p, node)| {
                Some(DirEntry {
                    name: p.file_name()?.to_os_string(),
                    is_dir: matches!(node, Node::Dir { .. }),
                })
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let abs = self.resolve(path);
        let mut tree = self.lock();
        for ancestor in abs.ancestors() {
            if let Some(Node::File(_)) = tree.get(ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{}: file exists", ancestor.display()),
                ));
            }
        }
        insert_dirs(&mut tree, &abs, mode);
        Ok(())
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<PathBuf>> {
        let relative = Path::new(pattern).is_relative();
        let abs_pattern = self.cwd.join(pattern);
        let compiled = glob::Pattern::new(&abs_pattern.to_string_lossy()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid glob pattern '{}': {}", pattern, e),
            )
        })?;
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };

        Ok(self
            .lock()
            .keys()
            .filter(|p| p.as_path() != Path::new("/"))
            .filter(|p| compiled.matches_path_with(p, options))
            .map(|p| {
                if relative {
                    p.strip_prefix(&self.cwd).unwrap_or(p.as_path()).to_path_buf()
                } else {
                    p.clone()
                }
            })
            .collect())
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}
