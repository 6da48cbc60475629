//! Local file backend.

use super::Backend;
use crate::datasource::content_type;
use crate::datasource::registry::BackendContext;
use crate::datasource::{DatasourceBinding, Fetched};
use crate::error::DatasourceError;
use crate::vfs::FileSystem;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads files (and lists directories) under a `file://` URL.
#[derive(Debug)]
pub struct FileBackend {
    alias: String,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileBackend {
    /// Create a backend for a `file://` binding.
    pub fn new(binding: &DatasourceBinding, ctx: &BackendContext) -> Result<Self, DatasourceError> {
        let root = binding
            .url
            .to_file_path()
            .map_err(|()| DatasourceError::Misconfigured {
                alias: binding.alias.clone(),
                message: format!("{} does not name a local path", binding.url),
            })?;
        Ok(Self {
            alias: binding.alias.clone(),
            root,
            fs: Arc::clone(&ctx.fs),
        })
    }

    fn error(&self, key: &str, path: &Path, err: std::io::Error) -> DatasourceError {
        match err.kind() {
            ErrorKind::NotFound => DatasourceError::NotFound {
                alias: self.alias.clone(),
                key: key.to_string(),
            },
            ErrorKind::PermissionDenied => DatasourceError::Unauthorized {
                alias: self.alias.clone(),
                message: format!("{}: {}", path.display(), err),
            },
            _ => DatasourceError::Unreachable {
                alias: self.alias.clone(),
                message: format!("Failed to read {}: {}", path.display(), err),
            },
        }
    }
}

/// Registry constructor for `file`.
pub fn open(
    binding: &DatasourceBinding,
    ctx: &BackendContext,
) -> Result<Arc<dyn Backend>, DatasourceError> {
    Ok(Arc::new(FileBackend::new(binding, ctx)?))
}

impl Backend for FileBackend {
    fn fetch(&self, path: &str) -> Result<Fetched, DatasourceError> {
        let relative = path.trim_start_matches('/');
        let full = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        };
        let key = if path.is_empty() {
            full.display().to_string()
        } else {
            path.to_string()
        };

        let meta = self
            .fs
            .metadata(&full)
            .map_err(|e| self.error(&key, &full, e))?;

        if meta.is_dir {
            let names = self
                .fs
                .read_dir(&full)
                .map_err(|e| self.error(&key, &full, e))?
                .into_iter()
                .map(|entry| {
                    entry.name.into_string().map_err(|name| DatasourceError::Unreachable {
                        alias: self.alias.clone(),
                        message: format!(
                            "{} holds a name that is not valid UTF-8: {}",
                            full.display(),
                            name.to_string_lossy()
                        ),
                    })
                })
                .collect::<Result<Vec<String>, _>>()?;
            return Ok(Fetched::new(
                serde_json::Value::from(names).to_string(),
                content_type::JSON,
            ));
        }

        let bytes = self
            .fs
            .read(&full)
            .map_err(|e| self.error(&key, &full, e))?;
        let content = String::from_utf8(bytes).map_err(|_| DatasourceError::Unreachable {
            alias: self.alias.clone(),
            message: format!("{} is not valid UTF-8", full.display()),
        })?;

        Ok(Fetched::new(content, content_type::from_extension(&full)))
    }
}
