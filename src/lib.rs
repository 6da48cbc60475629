//! Stencil - Template discovery and datasource resolution.
//!
//! Stencil finds the templates a render run should process (an inline
//! string, a list of files, or a mirrored directory tree), opens their
//! destinations, and resolves datasource aliases to content from local
//! files, HTTP(S), Consul and Vault.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Environment snapshot and variable names
//! - [`datasource`] - Alias bindings, backends and credential resolution
//! - [`error`] - Error types and result aliases
//! - [`template`] - Template location, directory walking and rendering
//! - [`vfs`] - Swappable filesystem and standard streams
//!
//! # Example
//!
//! ```
//! use stencil::config::Environment;
//! use stencil::datasource::{BackendContext, Datasources};
//! use stencil::template::{render_all, GatherOptions, TemplateLocator, VerbatimRenderer};
//! use stencil::vfs::{MemoryFileSystem, MemoryStreams};
//! use std::sync::Arc;
//!
//! let fs = Arc::new(MemoryFileSystem::new());
//! let streams = MemoryStreams::new();
//! let locator = TemplateLocator::new(fs.clone(), Arc::new(streams.clone()));
//! let sources = Datasources::new(BackendContext::new(fs, Environment::new()).unwrap());
//!
//! let options = GatherOptions {
//!     input: Some("Hello".to_string()),
//!     ..Default::default()
//! };
//! render_all(locator.gather(&options).unwrap(), &VerbatimRenderer, &sources).unwrap();
//! assert_eq!(streams.output(), "Hello");
//! ```

pub mod cli;
pub mod config;
pub mod datasource;
pub mod error;
pub mod template;
pub mod vfs;

pub use error::{Result, StencilError};
