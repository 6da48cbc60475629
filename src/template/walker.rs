//! Recursive input-to-output directory mirroring.

use crate::error::{Result, StencilError};
use crate::vfs::{absolutize, clean, FileSystem};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Absolute paths to skip during a walk.
///
/// Built once from glob patterns before walking; membership is an exact
/// path match, applied the same way at every depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet {
    paths: HashSet<PathBuf>,
}

impl ExcludeSet {
    /// Expand every pattern against the filesystem into absolute paths.
    pub fn expand(fs: &dyn FileSystem, patterns: &[String]) -> Result<Self> {
        let mut paths = HashSet::new();
        for pattern in patterns {
            let matches = fs.glob(pattern).map_err(|e| {
                if e.kind() == io::ErrorKind::InvalidInput {
                    StencilError::configuration(format!("invalid exclude pattern: {}", e))
                } else {
                    StencilError::Io(e)
                }
            })?;
            for path in matches {
                paths.insert(absolutize(fs, &path)?);
            }
        }
        Ok(Self { paths })
    }

    /// Whether the absolute path is excluded.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Number of excluded paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Source files and their mirrored destinations, aligned by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkedFiles {
    /// Source file paths, depth-first in listing order.
    pub inputs: Vec<PathBuf>,
    /// Destination paths, `outputs[i]` pairs with `inputs[i]`.
    pub outputs: Vec<PathBuf>,
}

impl WalkedFiles {
    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether no files were found.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Iterate over `(input, output)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.inputs
            .iter()
            .zip(&self.outputs)
            .map(|(i, o)| (i.as_path(), o.as_path()))
    }
}

/// Mirrors an input directory tree into an output directory tree.
#[derive(Debug, Clone)]
pub struct DirWalker {
    fs: Arc<dyn FileSystem>,
}

impl DirWalker {
    /// Create a walker over the given filesystem.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Walk `input_dir`, pairing every file with its path under `output_dir`.
    ///
    /// Output directories are created with the permission bits of the
    /// matching input directory. Re-running against an existing output
    /// tree succeeds and yields the same pairs.
    pub fn walk(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        exclude_globs: &[String],
    ) -> Result<WalkedFiles> {
        let input_dir = clean(input_dir);
        let output_dir = clean(output_dir);
        let input_abs = absolutize(self.fs.as_ref(), &input_dir)?;

        // Fail on a missing input before creating anything
        self.stat_dir(&input_dir)?;

        let excludes = ExcludeSet::expand(self.fs.as_ref(), exclude_globs)?;
        tracing::debug!(
            "Walking {} -> {} ({} excluded paths)",
            input_dir.display(),
            output_dir.display(),
            excludes.len()
        );

        let mut files = WalkedFiles::default();
        self.walk_dir(&input_dir, &input_abs, &output_dir, &excludes, &mut files)?;
        Ok(files)
    }

    fn stat_dir(&self, dir: &Path) -> Result<u32> {
        let walk_error = |source: io::Error| StencilError::Walk {
            path: dir.to_path_buf(),
            source,
        };
        let meta = self.fs.metadata(dir).map_err(walk_error)?;
        if !meta.is_dir {
            return Err(walk_error(io::Error::new(
                io::ErrorKind::Other,
                "not a directory",
            )));
        }
        Ok(meta.mode)
    }

    fn walk_dir(
        &self,
        dir: &Path,
        dir_abs: &Path,
        out_dir: &Path,
        excludes: &ExcludeSet,
        files: &mut WalkedFiles,
    ) -> Result<()> {
        let mode = self.stat_dir(dir)?;

        self.fs
            .create_dir_all(out_dir, mode)
            .map_err(|source| StencilError::Walk {
                path: out_dir.to_path_buf(),
                source,
            })?;

        let entries = self
            .fs
            .read_dir(dir)
            .map_err(|source| StencilError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;

        for entry in entries {
            // Identifiers downstream are strings; refuse names that cannot round-trip
            if entry.name.to_str().is_none() {
                return Err(StencilError::Walk {
                    path: dir.join(&entry.name),
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        "file name is not valid UTF-8",
                    ),
                });
            }

            let in_path = dir.join(&entry.name);
            let in_abs = dir_abs.join(&entry.name);
            let out_path = out_dir.join(&entry.name);

            if excludes.contains(&in_abs) {
                tracing::debug!("Excluding {}", in_path.display());
                continue;
            }

            if entry.is_dir {
                self.walk_dir(&in_path, &in_abs, &out_path, excludes, files)?;
            } else {
                files.inputs.push(in_path);
                files.outputs.push(out_path);
            }
        }

        Ok(())
    }
}
