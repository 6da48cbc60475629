//! Runtime configuration for Stencil.
//!
//! Caller options arrive through the CLI; everything else comes from the
//! process environment, captured once into an [`Environment`] snapshot and
//! handed to the datasource layer.
//!
//! # Example
//!
//! ```
//! use stencil::config::{Environment, VAULT_ADDR};
//!
//! let env = Environment::new().with(VAULT_ADDR, "http://127.0.0.1:8200");
//! assert_eq!(env.get(VAULT_ADDR), Some("http://127.0.0.1:8200"));
//! ```

pub mod environment;

pub use environment::{
    Environment, CONSUL_HTTP_ADDR, CONSUL_HTTP_SSL, CONSUL_HTTP_TOKEN, DEFAULT_CONSUL_ADDR,
    VAULT_ADDR, VAULT_AUTH_APPROLE_MOUNT, VAULT_AUTH_PASSWORD, VAULT_AUTH_PASSWORD_FILE,
    VAULT_AUTH_USERNAME, VAULT_AUTH_USERNAME_FILE, VAULT_AUTH_USERPASS_MOUNT, VAULT_ROLE_ID,
    VAULT_SECRET_ID, VAULT_TOKEN, VAULT_TOKEN_FILE,
};
