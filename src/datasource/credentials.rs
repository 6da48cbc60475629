//! Vault credential resolution.
//!
//! Credentials are discovered from the environment by an ordered list of
//! probes; the first probe that finds a complete set of settings decides
//! the [`AuthMethod`]:
//!
//! 1. `VAULT_TOKEN`
//! 2. `VAULT_TOKEN_FILE`
//! 3. `VAULT_AUTH_USERNAME` + `VAULT_AUTH_PASSWORD`
//! 4. the same pair, each optionally read from its `*_FILE` variable
//! 5. `VAULT_ROLE_ID` + `VAULT_SECRET_ID`
//!
//! # Example
//!
//! ```
//! use stencil::config::{Environment, VAULT_TOKEN};
//! use stencil::datasource::{AuthMethod, CredentialResolver};
//! use stencil::vfs::MemoryFileSystem;
//! use std::sync::Arc;
//!
//! let env = Environment::new().with(VAULT_TOKEN, "s.abc");
//! let resolver = CredentialResolver::new(env, Arc::new(MemoryFileSystem::new()));
//! assert_eq!(resolver.method().unwrap().name(), "token");
//! ```

use crate::config::{
    Environment, VAULT_AUTH_APPROLE_MOUNT, VAULT_AUTH_PASSWORD, VAULT_AUTH_PASSWORD_FILE,
    VAULT_AUTH_USERNAME, VAULT_AUTH_USERNAME_FILE, VAULT_AUTH_USERPASS_MOUNT, VAULT_ROLE_ID,
    VAULT_SECRET_ID, VAULT_TOKEN, VAULT_TOKEN_FILE,
};
use crate::error::AuthError;
use crate::vfs::FileSystem;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Mount point of the userpass method when not overridden.
pub const DEFAULT_USERPASS_MOUNT: &str = "userpass";

/// Mount point of the AppRole method when not overridden.
pub const DEFAULT_APPROLE_MOUNT: &str = "approle";

/// A way of obtaining a Vault session token.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// A token given directly or read from a file.
    Token { token: String, from_file: bool },
    /// Username and password against a userpass mount.
    UserPass {
        username: String,
        password: String,
        mount: String,
    },
    /// Role-id and secret-id against an AppRole mount.
    AppRole {
        role_id: String,
        secret_id: String,
        mount: String,
    },
}

impl AuthMethod {
    /// Short method name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::UserPass { .. } => "userpass",
            Self::AppRole { .. } => "approle",
        }
    }

    /// Exchange this method for a session credential.
    ///
    /// Tokens are already session credentials; the other methods perform
    /// exactly one login request against `addr`.
    pub fn login(&self, client: &Client, addr: &str) -> Result<SessionCredential, AuthError> {
        match self {
            Self::Token { token, .. } => Ok(SessionCredential::new(token.clone())),
            Self::UserPass {
                username,
                password,
                mount,
            } => exchange(
                client,
                self.name(),
                login_url(self.name(), addr, mount, Some(username))?,
                json!({ "password": password }),
            ),
            Self::AppRole {
                role_id,
                secret_id,
                mount,
            } => exchange(
                client,
                self.name(),
                login_url(self.name(), addr, mount, None)?,
                json!({ "role_id": role_id, "secret_id": secret_id }),
            ),
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token { from_file, .. } => f
                .debug_struct("Token")
                .field("from_file", from_file)
                .finish_non_exhaustive(),
            Self::UserPass {
                username, mount, ..
            } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("mount", mount)
                .finish_non_exhaustive(),
            Self::AppRole { mount, .. } => f
                .debug_struct("AppRole")
                .field("mount", mount)
                .finish_non_exhaustive(),
        }
    }
}

/// A Vault token good for the rest of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token itself, for request headers.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    auth: Option<LoginAuth>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LoginAuth {
    client_token: String,
}

/// `<addr>/v1/auth/<mount>/login[/<username>]`, with each segment percent-encoded.
fn login_url(
    method: &str,
    addr: &str,
    mount: &str,
    username: Option<&str>,
) -> Result<Url, AuthError> {
    let invalid = |detail: String| AuthError::LoginFailed {
        method: method.to_string(),
        message: format!("invalid Vault address {}: {}", addr, detail),
    };

    let mut url = Url::parse(addr).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("cannot carry a path".to_string()))?
        .pop_if_empty()
        .extend(["v1", "auth"])
        .extend(mount.split('/').filter(|s| !s.is_empty()))
        .push("login")
        .extend(username);
    Ok(url)
}

fn exchange(
    client: &Client,
    method: &str,
    url: Url,
    body: serde_json::Value,
) -> Result<SessionCredential, AuthError> {
    let failed = |message: String| AuthError::LoginFailed {
        method: method.to_string(),
        message,
    };

    let response = client
        .post(url)
        .json(&body)
        .send()
        .map_err(|e| failed(e.to_string()))?;
    let status = response.status();
    let parsed: LoginResponse = response.json().unwrap_or_default();

    if !status.is_success() {
        let detail = if parsed.errors.is_empty() {
            String::new()
        } else {
            format!(": {}", parsed.errors.join(", "))
        };
        return Err(failed(format!("HTTP {}{}", status, detail)));
    }

    parsed
        .auth
        .map(|auth| SessionCredential::new(auth.client_token))
        .ok_or_else(|| failed("response carried no client token".to_string()))
}

type Probe = fn(&Environment, &dyn FileSystem) -> Result<Option<AuthMethod>, AuthError>;

/// Probes in precedence order.
const PROBES: [Probe; 5] = [
    token,
    token_file,
    userpass,
    userpass_from_files,
    approle,
];

fn token(env: &Environment, _fs: &dyn FileSystem) -> Result<Option<AuthMethod>, AuthError> {
    Ok(env.get(VAULT_TOKEN).map(|token| AuthMethod::Token {
        token: token.to_string(),
        from_file: false,
    }))
}

fn token_file(env: &Environment, fs: &dyn FileSystem) -> Result<Option<AuthMethod>, AuthError> {
    Ok(read_secret_file(env, fs, VAULT_TOKEN_FILE)?.map(|token| AuthMethod::Token {
        token,
        from_file: true,
    }))
}

fn userpass(env: &Environment, _fs: &dyn FileSystem) -> Result<Option<AuthMethod>, AuthError> {
    let (Some(username), Some(password)) = (env.get(VAULT_AUTH_USERNAME), env.get(VAULT_AUTH_PASSWORD))
    else {
        return Ok(None);
    };
    Ok(Some(AuthMethod::UserPass {
        username: username.to_string(),
        password: password.to_string(),
        mount: userpass_mount(env),
    }))
}

fn userpass_from_files(
    env: &Environment,
    fs: &dyn FileSystem,
) -> Result<Option<AuthMethod>, AuthError> {
    let username = value_or_file(env, fs, VAULT_AUTH_USERNAME, VAULT_AUTH_USERNAME_FILE)?;
    let password = value_or_file(env, fs, VAULT_AUTH_PASSWORD, VAULT_AUTH_PASSWORD_FILE)?;
    Ok(match (username, password) {
        (Some(username), Some(password)) => Some(AuthMethod::UserPass {
            username,
            password,
            mount: userpass_mount(env),
        }),
        _ => None,
    })
}

fn approle(env: &Environment, _fs: &dyn FileSystem) -> Result<Option<AuthMethod>, AuthError> {
    let (Some(role_id), Some(secret_id)) = (env.get(VAULT_ROLE_ID), env.get(VAULT_SECRET_ID)) else {
        return Ok(None);
    };
    Ok(Some(AuthMethod::AppRole {
        role_id: role_id.to_string(),
        secret_id: secret_id.to_string(),
        mount: env
            .get_or(VAULT_AUTH_APPROLE_MOUNT, DEFAULT_APPROLE_MOUNT)
            .to_string(),
    }))
}

fn userpass_mount(env: &Environment) -> String {
    env.get_or(VAULT_AUTH_USERPASS_MOUNT, DEFAULT_USERPASS_MOUNT)
        .to_string()
}

fn value_or_file(
    env: &Environment,
    fs: &dyn FileSystem,
    variable: &str,
    file_variable: &str,
) -> Result<Option<String>, AuthError> {
    match env.get(variable) {
        Some(value) => Ok(Some(value.to_string())),
        None => read_secret_file(env, fs, file_variable),
    }
}

/// Read the file named by `variable`, trimmed. Blank files count as unset.
fn read_secret_file(
    env: &Environment,
    fs: &dyn FileSystem,
    variable: &str,
) -> Result<Option<String>, AuthError> {
    let Some(path) = env.get(variable) else {
        return Ok(None);
    };
    let bytes = fs
        .read(Path::new(path))
        .map_err(|source| AuthError::CredentialFile {
            variable: variable.to_string(),
            path: path.into(),
            source,
        })?;
    let value = String::from_utf8_lossy(&bytes).trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Picks an [`AuthMethod`] from the environment and logs in with it.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    env: Environment,
    fs: Arc<dyn FileSystem>,
}

impl CredentialResolver {
    /// Create a resolver reading credential files through `fs`.
    pub fn new(env: Environment, fs: Arc<dyn FileSystem>) -> Self {
        Self { env, fs }
    }

    /// The first method whose settings are present.
    pub fn method(&self) -> Result<AuthMethod, AuthError> {
        for probe in PROBES {
            if let Some(method) = probe(&self.env, self.fs.as_ref())? {
                return Ok(method);
            }
        }
        Err(AuthError::NoCredentialsFound)
    }

    /// Choose a method and exchange it for a session credential.
    pub fn resolve(&self, client: &Client, addr: &str) -> Result<SessionCredential, AuthError> {
        let method = self.method()?;
        tracing::info!("Authenticating to Vault at {} with {}", addr, method.name());
        method.login(client, addr)
    }
}
