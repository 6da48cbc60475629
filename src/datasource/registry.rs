//! Scheme dispatch and lazily-connected datasource handles.

use super::backend::{self, Backend};
use super::{DatasourceBinding, Fetched};
use crate::config::Environment;
use crate::error::{DatasourceError, Result};
use crate::vfs::FileSystem;
use anyhow::Context;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Transport timeout used unless the caller picks another.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a backend for a binding. Called at most once per alias.
pub type BackendConstructor = Arc<
    dyn Fn(&DatasourceBinding, &BackendContext) -> std::result::Result<Arc<dyn Backend>, DatasourceError>
        + Send
        + Sync,
>;

/// Shared resources handed to backend constructors.
#[derive(Debug, Clone)]
pub struct BackendContext {
    /// Filesystem for `file://` data and credential files.
    pub fs: Arc<dyn FileSystem>,
    /// Environment snapshot for addresses and credentials.
    pub env: Environment,
    /// HTTP client shared by every network backend.
    pub client: Client,
}

impl BackendContext {
    /// Create a context with the default transport timeout.
    pub fn new(fs: Arc<dyn FileSystem>, env: Environment) -> Result<Self> {
        Self::with_timeout(fs, env, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a context whose HTTP client uses `timeout`.
    pub fn with_timeout(fs: Arc<dyn FileSystem>, env: Environment, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stencil/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { fs, env, client })
    }
}

/// Maps URL schemes to backend constructors.
#[derive(Clone)]
pub struct BackendRegistry {
    constructors: HashMap<String, BackendConstructor>,
}

impl BackendRegistry {
    /// A registry with no schemes.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry with the file, HTTP, Consul and Vault schemes.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("file", backend::file::open);
        for scheme in ["http", "https"] {
            registry.register(scheme, backend::http::open);
        }
        for scheme in ["consul", "consul+http", "consul+https"] {
            registry.register(scheme, backend::consul::open);
        }
        for scheme in ["vault", "vault+http", "vault+https"] {
            registry.register(scheme, backend::vault::open);
        }
        registry
    }

    /// Register (or replace) the constructor for a scheme.
    pub fn register<F>(&mut self, scheme: impl Into<String>, constructor: F)
    where
        F: Fn(&DatasourceBinding, &BackendContext) -> std::result::Result<Arc<dyn Backend>, DatasourceError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(scheme.into(), Arc::new(constructor));
    }

    /// Constructor for a scheme, if registered.
    pub fn get(&self, scheme: &str) -> Option<&BackendConstructor> {
        self.constructors.get(scheme)
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

type Handle = Mutex<Option<Arc<dyn Backend>>>;

/// The set of bound aliases and their backend handles.
///
/// Handles are created on first use and kept for the life of the value.
/// Creation runs under a per-alias lock, so concurrent first reads of one
/// alias trigger a single connect (and a single login); reads through an
/// established handle do not hold the lock.
#[derive(Debug)]
pub struct Datasources {
    bindings: HashMap<String, DatasourceBinding>,
    handles: HashMap<String, Handle>,
    backends: BackendRegistry,
    context: BackendContext,
}

impl Datasources {
    /// An empty set using the built-in backends.
    pub fn new(context: BackendContext) -> Self {
        Self::with_backends(context, BackendRegistry::with_builtins())
    }

    /// An empty set using a custom backend registry.
    pub fn with_backends(context: BackendContext, backends: BackendRegistry) -> Self {
        Self {
            bindings: HashMap::new(),
            handles: HashMap::new(),
            backends,
            context,
        }
    }

    /// Bind an alias, replacing any earlier binding and its handle.
    pub fn add(&mut self, binding: DatasourceBinding) {
        let alias = binding.alias.clone();
        if self.bindings.contains_key(&alias) {
            tracing::warn!("Datasource '{}' redefined; using the last definition", alias);
        }
        self.handles.insert(alias.clone(), Mutex::new(None));
        self.bindings.insert(alias, binding);
    }

    /// Binding for an alias.
    pub fn binding(&self, alias: &str) -> Option<&DatasourceBinding> {
        self.bindings.get(alias)
    }

    /// Mutable binding for an alias, e.g. to attach headers.
    pub fn binding_mut(&mut self, alias: &str) -> Option<&mut DatasourceBinding> {
        self.bindings.get_mut(alias)
    }

    /// Bound aliases, sorted.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<_> = self.bindings.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    /// Whether the alias's backend has been created.
    pub fn is_connected(&self, alias: &str) -> bool {
        self.handles
            .get(alias)
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .unwrap_or(false)
    }

    /// Fetch `path` through the alias's backend, connecting it if needed.
    ///
    /// A `type` override on the bound URL replaces the backend's content type.
    pub fn resolve(&self, alias: &str, path: &str) -> std::result::Result<Fetched, DatasourceError> {
        let binding = self
            .bindings
            .get(alias)
            .ok_or_else(|| DatasourceError::UnknownAlias {
                alias: alias.to_string(),
            })?;
        let backend = self.handle(binding)?;

        tracing::debug!("Fetching [{}] from datasource '{}'", path, alias);
        let mut fetched = backend.fetch(path)?;
        if let Some(forced) = &binding.content_type {
            fetched.content_type = forced.clone();
        }
        Ok(fetched)
    }

    fn handle(&self, binding: &DatasourceBinding) -> std::result::Result<Arc<dyn Backend>, DatasourceError> {
        let alias = &binding.alias;
        let slot = self
            .handles
            .get(alias)
            .ok_or_else(|| DatasourceError::UnknownAlias {
                alias: alias.clone(),
            })?;

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(backend) = guard.as_ref() {
            return Ok(Arc::clone(backend));
        }

        let scheme = binding.url.scheme();
        let constructor = self
            .backends
            .get(scheme)
            .ok_or_else(|| DatasourceError::UnsupportedScheme {
                alias: alias.clone(),
                scheme: scheme.to_string(),
            })?;

        tracing::debug!("Connecting datasource '{}' ({})", alias, scheme);
        let backend = constructor(binding, &self.context)?;
        *guard = Some(Arc::clone(&backend));
        Ok(backend)
    }
}
