//! Per-scheme datasource backends.
//!
//! Every backend answers one question: what is stored under `path`? The
//! scheme of an alias's URL picks which backend answers it, see
//! [`BackendRegistry`](super::BackendRegistry).

pub mod consul;
pub mod file;
pub mod http;
pub mod vault;

pub use consul::ConsulBackend;
pub use file::FileBackend;
pub use http::HttpBackend;
pub use vault::VaultBackend;

use super::Fetched;
use crate::error::DatasourceError;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::StatusCode;
use std::fmt;
use url::Url;

/// Uniform fetch-by-path access to one store.
///
/// Implementations must tolerate concurrent `fetch` calls.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Fetch the content stored under `path`, relative to the bound URL.
    fn fetch(&self, path: &str) -> Result<Fetched, DatasourceError>;
}

/// Join a URL path prefix and a key into a slash-separated store key.
pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    [prefix, key]
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// `host[:port]` of a URL, if it names a host.
pub(crate) fn authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Send a request and map transport failures and error statuses.
///
/// 404 becomes `NotFound` for `key`, 401/403 `Unauthorized`, anything else
/// unsuccessful `Unreachable`.
pub(crate) fn send(
    alias: &str,
    key: &str,
    request: RequestBuilder,
) -> Result<Response, DatasourceError> {
    let response = request
        .send()
        .map_err(|e| DatasourceError::Unreachable {
            alias: alias.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = format!("HTTP {} fetching {}", status, response.url());
    Err(match status {
        StatusCode::NOT_FOUND => DatasourceError::NotFound {
            alias: alias.to_string(),
            key: key.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DatasourceError::Unauthorized {
            alias: alias.to_string(),
            message,
        },
        _ => DatasourceError::Unreachable {
            alias: alias.to_string(),
            message,
        },
    })
}

/// Read a response body as text.
pub(crate) fn read_body(alias: &str, response: Response) -> Result<String, DatasourceError> {
    let url = response.url().clone();
    response.text().map_err(|e| DatasourceError::Unreachable {
        alias: alias.to_string(),
        message: format!("Failed to read response from {}: {}", url, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_key_trims_slashes() {
        assert_eq!(join_key("/secret/", "db/password"), "secret/db/password");
        assert_eq!(join_key("/", "foo"), "foo");
        assert_eq!(join_key("", "/foo/"), "foo");
        assert_eq!(join_key("/app", ""), "app");
        assert_eq!(join_key("", ""), "");
    }

    #[test]
    fn authority_includes_port() {
        let url = Url::parse("consul+http://127.0.0.1:8500/app").unwrap();
        assert_eq!(authority(&url).as_deref(), Some("127.0.0.1:8500"));
    }

    #[test]
    fn authority_without_port() {
        let url = Url::parse("vault://vault.example.com/secret").unwrap();
        assert_eq!(authority(&url).as_deref(), Some("vault.example.com"));
    }

    #[test]
    fn authority_absent_for_hostless_url() {
        let url = Url::parse("vault:///secret").unwrap();
        assert_eq!(authority(&url), None);
    }
}
