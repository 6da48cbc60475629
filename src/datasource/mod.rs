//! Datasource resolution.
//!
//! Templates refer to external data through short aliases. Each alias is
//! bound to a URL ([`DatasourceBinding`]); the URL scheme selects a
//! [`Backend`] when the alias is first resolved, not when it is bound.
//!
//! | Scheme | Backend |
//! |--------|---------|
//! | `file` | [`FileBackend`] |
//! | `http`, `https` | [`HttpBackend`] |
//! | `consul`, `consul+http`, `consul+https` | [`ConsulBackend`] |
//! | `vault`, `vault+http`, `vault+https` | [`VaultBackend`] |
//!
//! # Example
//!
//! ```
//! use stencil::config::Environment;
//! use stencil::datasource::{BackendContext, DatasourceBinding, Datasources};
//! use stencil::vfs::MemoryFileSystem;
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new();
//! fs.add_file("/data/greeting.txt", "hello");
//!
//! let ctx = BackendContext::new(Arc::new(fs.clone()), Environment::new()).unwrap();
//! let mut sources = Datasources::new(ctx);
//! sources.add(DatasourceBinding::parse("greeting=/data/greeting.txt", &fs).unwrap());
//!
//! let fetched = sources.resolve("greeting", "").unwrap();
//! assert_eq!(fetched.content, "hello");
//! assert_eq!(fetched.content_type, "text/plain");
//! ```

pub mod backend;
pub mod binding;
pub mod content_type;
pub mod credentials;
pub mod registry;

pub use backend::{Backend, ConsulBackend, FileBackend, HttpBackend, VaultBackend};
pub use binding::{DatasourceBinding, HeaderArg};
pub use credentials::{AuthMethod, CredentialResolver, SessionCredential};
pub use registry::{BackendContext, BackendRegistry, Datasources, DEFAULT_HTTP_TIMEOUT};

use anyhow::{bail, Context};

/// Content fetched from a datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// The raw content.
    pub content: String,
    /// Media type the content should be interpreted as.
    pub content_type: String,
}

impl Fetched {
    /// Create fetched content.
    pub fn new(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// Decode structured content for nested access.
    ///
    /// JSON and YAML become their value tree; anything textual becomes a
    /// string value.
    pub fn decode(&self) -> anyhow::Result<serde_json::Value> {
        match self.content_type.as_str() {
            content_type::JSON => {
                serde_json::from_str(&self.content).context("Failed to parse JSON content")
            }
            content_type::YAML => {
                serde_yaml::from_str(&self.content).context("Failed to parse YAML content")
            }
            content_type::CSV | content_type::TOML => {
                bail!("Decoding {} content is not supported", self.content_type)
            }
            _ => Ok(serde_json::Value::String(self.content.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_json() {
        let fetched = Fetched::new(r#"{"db":{"port":5432}}"#, content_type::JSON);
        let value = fetched.decode().unwrap();
        assert_eq!(value["db"]["port"], json!(5432));
    }

    #[test]
    fn decode_yaml() {
        let fetched = Fetched::new("db:\n  hosts:\n    - a\n    - b\n", content_type::YAML);
        let value = fetched.decode().unwrap();
        assert_eq!(value["db"]["hosts"][1], json!("b"));
    }

    #[test]
    fn decode_text_is_string() {
        let fetched = Fetched::new("bar", content_type::TEXT);
        assert_eq!(fetched.decode().unwrap(), json!("bar"));
    }

    #[test]
    fn decode_unknown_type_is_string() {
        let fetched = Fetched::new("<html/>", "text/html");
        assert_eq!(fetched.decode().unwrap(), json!("<html/>"));
    }

    #[test]
    fn decode_invalid_json_fails() {
        let fetched = Fetched::new("{not json", content_type::JSON);
        let err = fetched.decode().unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn decode_csv_unsupported() {
        let fetched = Fetched::new("a,b\n1,2", content_type::CSV);
        assert!(fetched.decode().is_err());
    }
}
