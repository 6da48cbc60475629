//! Error types for Stencil operations.
//!
//! This module defines [`StencilError`], the primary error type used while
//! gathering templates, and the datasource-layer errors [`DatasourceError`]
//! and [`AuthError`], plus a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every error is fatal to the invocation; nothing is retried
//! - Every message names the resource that failed (path, alias, or key)
//! - Use `anyhow::Error` (via `StencilError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Stencil operations.
#[derive(Debug, Error)]
pub enum StencilError {
    /// Inconsistent input/output options.
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// A template source could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A destination could not be opened for writing.
    #[error("Failed to open {path} for writing: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An input directory could not be walked.
    #[error("Failed to walk directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Datasource resolution failed.
    #[error(transparent)]
    Datasource(#[from] DatasourceError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StencilError {
    /// Shorthand for a [`StencilError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Errors raised while resolving a datasource alias to content.
#[derive(Debug, Error)]
pub enum DatasourceError {
    /// The key is absent from the backing store.
    #[error("No value found for [{key}] from datasource '{alias}'")]
    NotFound { alias: String, key: String },

    /// The backing store could not be reached or answered with a failure.
    #[error("Datasource '{alias}' is unreachable: {message}")]
    Unreachable { alias: String, message: String },

    /// The backing store rejected our credentials.
    #[error("Datasource '{alias}' denied access: {message}")]
    Unauthorized { alias: String, message: String },

    /// No binding exists for the alias.
    #[error("Undefined datasource '{alias}'")]
    UnknownAlias { alias: String },

    /// No backend is registered for the URL scheme.
    #[error("Datasource '{alias}' uses unsupported scheme '{scheme}'")]
    UnsupportedScheme { alias: String, scheme: String },

    /// A `alias=URL` argument could not be parsed.
    #[error("Invalid datasource '{arg}': {message}")]
    InvalidBinding { arg: String, message: String },

    /// The backend is missing settings it needs (e.g. a server address).
    #[error("Datasource '{alias}' is misconfigured: {message}")]
    Misconfigured { alias: String, message: String },

    /// Authenticating against the backing store failed.
    #[error("Authentication for datasource '{alias}' failed: {source}")]
    Auth {
        alias: String,
        #[source]
        source: AuthError,
    },
}

/// Errors raised while acquiring a session credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// None of the supported credential sources was configured.
    #[error("No credentials found; set a token, username/password, or role-id/secret-id")]
    NoCredentialsFound,

    /// The login exchange was rejected or malformed.
    #[error("{method} login failed: {message}")]
    LoginFailed { method: String, message: String },

    /// A credential file named by an environment variable could not be read.
    #[error("Failed to read {variable} file {path}: {source}")]
    CredentialFile {
        variable: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Stencil operations.
pub type Result<T> = std::result::Result<T, StencilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_displays_message() {
        let err = StencilError::configuration("--input-dir requires --output-dir");
        assert!(err.to_string().contains("--input-dir requires --output-dir"));
    }

    #[test]
    fn read_error_displays_path() {
        let err = StencilError::Read {
            path: "/templates/missing.tmpl".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/templates/missing.tmpl"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn write_error_displays_path() {
        let err = StencilError::Write {
            path: "/readonly/out.txt".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/readonly/out.txt"));
    }

    #[test]
    fn not_found_names_alias_and_key() {
        let err = DatasourceError::NotFound {
            alias: "vault".into(),
            key: "bar".into(),
        };
        assert_eq!(
            err.to_string(),
            "No value found for [bar] from datasource 'vault'"
        );
    }

    #[test]
    fn unsupported_scheme_displays_scheme() {
        let err = DatasourceError::UnsupportedScheme {
            alias: "data".into(),
            scheme: "ftp".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("data"));
        assert!(msg.contains("ftp"));
    }

    #[test]
    fn auth_error_wraps_login_failure() {
        let err = DatasourceError::Auth {
            alias: "secrets".into(),
            source: AuthError::LoginFailed {
                method: "userpass".into(),
                message: "HTTP 400".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("secrets"));
        assert!(msg.contains("userpass login failed"));
    }

    #[test]
    fn datasource_error_converts_to_stencil_error() {
        let err: StencilError = DatasourceError::UnknownAlias {
            alias: "nope".into(),
        }
        .into();
        assert!(matches!(err, StencilError::Datasource(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StencilError = io_err.into();
        assert!(matches!(err, StencilError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(StencilError::configuration("test"))
        }
        assert!(returns_error().is_err());
    }
}
