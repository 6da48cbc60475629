//! Environment variable snapshot.
//!
//! Backends read settings and credentials from an [`Environment`] rather
//! than from `std::env` directly, so tests never mutate process state.

use std::collections::HashMap;
use std::fmt;

/// Vault server address.
pub const VAULT_ADDR: &str = "VAULT_ADDR";
/// Vault token.
pub const VAULT_TOKEN: &str = "VAULT_TOKEN";
/// File holding a Vault token.
pub const VAULT_TOKEN_FILE: &str = "VAULT_TOKEN_FILE";
/// Username for the userpass method.
pub const VAULT_AUTH_USERNAME: &str = "VAULT_AUTH_USERNAME";
/// File holding the userpass username.
pub const VAULT_AUTH_USERNAME_FILE: &str = "VAULT_AUTH_USERNAME_FILE";
/// Password for the userpass method.
pub const VAULT_AUTH_PASSWORD: &str = "VAULT_AUTH_PASSWORD";
/// File holding the userpass password.
pub const VAULT_AUTH_PASSWORD_FILE: &str = "VAULT_AUTH_PASSWORD_FILE";
/// Mount point of the userpass method.
pub const VAULT_AUTH_USERPASS_MOUNT: &str = "VAULT_AUTH_USERPASS_MOUNT";
/// AppRole role-id.
pub const VAULT_ROLE_ID: &str = "VAULT_ROLE_ID";
/// AppRole secret-id.
pub const VAULT_SECRET_ID: &str = "VAULT_SECRET_ID";
/// Mount point of the AppRole method.
pub const VAULT_AUTH_APPROLE_MOUNT: &str = "VAULT_AUTH_APPROLE_MOUNT";

/// Consul agent address (`host:port` or a full URL).
pub const CONSUL_HTTP_ADDR: &str = "CONSUL_HTTP_ADDR";
/// Consul ACL token.
pub const CONSUL_HTTP_TOKEN: &str = "CONSUL_HTTP_TOKEN";
/// Use https when the Consul address has no scheme.
pub const CONSUL_HTTP_SSL: &str = "CONSUL_HTTP_SSL";
/// Consul address used when [`CONSUL_HTTP_ADDR`] is unset.
pub const DEFAULT_CONSUL_ADDR: &str = "localhost:8500";

/// An immutable-by-convention map of environment variables.
///
/// Empty values are treated as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Get a variable, treating empty values as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Get a variable or a default.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether a variable holds a true-ish value (`1`, `t`, `true`, `yes`).
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "t" | "true" | "yes"))
            .unwrap_or(false)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Values may be secrets; only names are printed
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("Environment").field("keys", &keys).finish()
    }
}
