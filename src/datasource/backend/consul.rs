//! Consul key-value backend.

use super::{authority, join_key, read_body, send, Backend};
use crate::config::{
    Environment, CONSUL_HTTP_ADDR, CONSUL_HTTP_SSL, CONSUL_HTTP_TOKEN, DEFAULT_CONSUL_ADDR,
};
use crate::datasource::content_type;
use crate::datasource::registry::BackendContext;
use crate::datasource::{DatasourceBinding, Fetched};
use crate::error::DatasourceError;
use reqwest::blocking::Client;
use std::fmt;
use std::sync::Arc;
use url::Url;

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Reads raw values from the Consul KV store.
pub struct ConsulBackend {
    alias: String,
    addr: String,
    prefix: String,
    token: Option<String>,
    client: Client,
}

impl ConsulBackend {
    /// Create a backend for a `consul`, `consul+http` or `consul+https` binding.
    pub fn new(binding: &DatasourceBinding, ctx: &BackendContext) -> Self {
        let addr = address(&binding.url, &ctx.env);
        tracing::debug!("Datasource '{}' reads Consul at {}", binding.alias, addr);
        Self {
            alias: binding.alias.clone(),
            addr,
            prefix: binding.url.path().to_string(),
            token: ctx.env.get(CONSUL_HTTP_TOKEN).map(String::from),
            client: ctx.client.clone(),
        }
    }
}

/// Registry constructor for the Consul schemes.
pub fn open(
    binding: &DatasourceBinding,
    ctx: &BackendContext,
) -> Result<Arc<dyn Backend>, DatasourceError> {
    Ok(Arc::new(ConsulBackend::new(binding, ctx)))
}

/// Work out the agent address for a Consul URL.
///
/// An explicit host wins; otherwise `CONSUL_HTTP_ADDR` (or the local agent)
/// is used. The `+http`/`+https` suffix picks the protocol, and plain
/// `consul` honors `CONSUL_HTTP_SSL`.
fn address(url: &Url, env: &Environment) -> String {
    let protocol = match url.scheme() {
        "consul+https" => "https",
        "consul+http" => "http",
        _ if env.is_true(CONSUL_HTTP_SSL) => "https",
        _ => "http",
    };

    let addr = match authority(url) {
        Some(host) => host,
        None => env.get_or(CONSUL_HTTP_ADDR, DEFAULT_CONSUL_ADDR).to_string(),
    };

    if addr.contains("://") {
        addr.trim_end_matches('/').to_string()
    } else {
        format!("{}://{}", protocol, addr.trim_end_matches('/'))
    }
}

impl Backend for ConsulBackend {
    fn fetch(&self, path: &str) -> Result<Fetched, DatasourceError> {
        let key = join_key(&self.prefix, path);
        let url = format!("{}/v1/kv/{}?raw", self.addr, key);
        tracing::debug!("Reading Consul key {}", key);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token.as_str());
        }

        let missing = if path.is_empty() { key.as_str() } else { path };
        let response = send(&self.alias, missing, request)?;
        Ok(Fetched::new(
            read_body(&self.alias, response)?,
            content_type::TEXT,
        ))
    }
}

impl fmt::Debug for ConsulBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsulBackend")
            .field("alias", &self.alias)
            .field("addr", &self.addr)
            .field("prefix", &self.prefix)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
