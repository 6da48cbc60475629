//! Plain HTTP(S) backend.

use super::{read_body, send, Backend};
use crate::datasource::content_type;
use crate::datasource::registry::BackendContext;
use crate::datasource::{DatasourceBinding, Fetched};
use crate::error::DatasourceError;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use url::Url;

/// Fetches documents over HTTP or HTTPS.
#[derive(Debug)]
pub struct HttpBackend {
    alias: String,
    url: Url,
    headers: Vec<(String, String)>,
    client: Client,
}

impl HttpBackend {
    /// Create a backend for an `http(s)://` binding.
    pub fn new(binding: &DatasourceBinding, ctx: &BackendContext) -> Self {
        Self {
            alias: binding.alias.clone(),
            url: binding.url.clone(),
            headers: binding.headers.clone(),
            client: ctx.client.clone(),
        }
    }

    fn target(&self, path: &str) -> Result<Url, DatasourceError> {
        if path.is_empty() {
            return Ok(self.url.clone());
        }
        self.url
            .join(path)
            .map_err(|e| DatasourceError::Misconfigured {
                alias: self.alias.clone(),
                message: format!("Cannot resolve {} against {}: {}", path, self.url, e),
            })
    }
}

/// Registry constructor for `http` and `https`.
pub fn open(
    binding: &DatasourceBinding,
    ctx: &BackendContext,
) -> Result<Arc<dyn Backend>, DatasourceError> {
    Ok(Arc::new(HttpBackend::new(binding, ctx)))
}

impl Backend for HttpBackend {
    fn fetch(&self, path: &str) -> Result<Fetched, DatasourceError> {
        let url = self.target(path)?;
        let key = if path.is_empty() {
            url.path().to_string()
        } else {
            path.to_string()
        };

        let mut request = self.client.get(url.as_str());
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = send(&self.alias, &key, request)?;
        let kind = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(content_type::from_header)
            .unwrap_or_else(|| content_type::TEXT.to_string());

        Ok(Fetched::new(read_body(&self.alias, response)?, kind))
    }
}
