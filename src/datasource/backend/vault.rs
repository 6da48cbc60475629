//! HashiCorp Vault backend.

use super::{authority, join_key, read_body, send, Backend};
use crate::config::{Environment, VAULT_ADDR};
use crate::datasource::content_type;
use crate::datasource::credentials::{CredentialResolver, SessionCredential};
use crate::datasource::registry::BackendContext;
use crate::datasource::{DatasourceBinding, Fetched};
use crate::error::DatasourceError;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Reads secrets from Vault with a session token obtained at connect time.
#[derive(Debug)]
pub struct VaultBackend {
    alias: String,
    addr: String,
    mount: String,
    params: BTreeMap<String, String>,
    credential: SessionCredential,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl VaultBackend {
    /// Resolve credentials, log in once, and return a ready backend.
    pub fn connect(binding: &DatasourceBinding, ctx: &BackendContext) -> Result<Self, DatasourceError> {
        let addr = address(&binding.alias, &binding.url, &ctx.env)?;
        let credential = CredentialResolver::new(ctx.env.clone(), Arc::clone(&ctx.fs))
            .resolve(&ctx.client, &addr)
            .map_err(|source| DatasourceError::Auth {
                alias: binding.alias.clone(),
                source,
            })?;

        Ok(Self {
            alias: binding.alias.clone(),
            addr,
            mount: binding.url.path().to_string(),
            params: binding.url.query_pairs().into_owned().collect(),
            credential,
            client: ctx.client.clone(),
        })
    }
}

/// Registry constructor for the Vault schemes.
pub fn open(
    binding: &DatasourceBinding,
    ctx: &BackendContext,
) -> Result<Arc<dyn Backend>, DatasourceError> {
    Ok(Arc::new(VaultBackend::connect(binding, ctx)?))
}

/// Work out the server address for a Vault URL.
///
/// `vault+http(s)://host` names the server directly, `vault://host` implies
/// https, and a hostless URL falls back to `VAULT_ADDR`.
fn address(alias: &str, url: &Url, env: &Environment) -> Result<String, DatasourceError> {
    if let Some(host) = authority(url) {
        let protocol = match url.scheme() {
            "vault+http" => "http",
            _ => "https",
        };
        return Ok(format!("{}://{}", protocol, host));
    }

    env.get(VAULT_ADDR)
        .map(|addr| addr.trim_end_matches('/').to_string())
        .ok_or_else(|| DatasourceError::Misconfigured {
            alias: alias.to_string(),
            message: format!("{} is not set and {} names no host", VAULT_ADDR, url),
        })
}

impl Backend for VaultBackend {
    fn fetch(&self, path: &str) -> Result<Fetched, DatasourceError> {
        let key = join_key(&self.mount, path);
        let url = format!("{}/v1/{}", self.addr, key);

        // Extra parameters mean a write, as used for dynamic secrets
        let request = if self.params.is_empty() {
            tracing::debug!("Reading Vault secret {}", key);
            self.client.get(&url)
        } else {
            tracing::debug!("Writing to Vault path {}", key);
            self.client.post(&url).json(&self.params)
        };
        let request = request.header(TOKEN_HEADER, self.credential.secret());

        let missing = if path.is_empty() { key.as_str() } else { path };
        let response = send(&self.alias, missing, request)?;
        let body = read_body(&self.alias, response)?;

        let not_found = || DatasourceError::NotFound {
            alias: self.alias.clone(),
            key: missing.to_string(),
        };
        let secret: SecretResponse = serde_json::from_str(&body).map_err(|_| not_found())?;
        match secret.data {
            Some(data) if !data.is_null() => Ok(Fetched::new(data.to_string(), content_type::JSON)),
            _ => Err(not_found()),
        }
    }
}
