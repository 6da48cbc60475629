//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Environment;
use crate::datasource::{
    BackendContext, DatasourceBinding, Datasources, HeaderArg, DEFAULT_HTTP_TIMEOUT,
};
use crate::error::{DatasourceError, Result};
use crate::template::GatherOptions;
use crate::vfs::FileSystem;

/// Stencil - Render templates with data from files, HTTP, Consul and Vault.
#[derive(Debug, Parser)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Render options used when no subcommand is given
    #[command(flatten)]
    pub render: RenderArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render templates (default if no command specified)
    Render(RenderArgs),

    /// Resolve a datasource alias and print its content
    Fetch(FetchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Datasource bindings shared by `render` and `fetch`.
#[derive(Debug, Clone, clap::Args)]
pub struct DatasourceArgs {
    /// Bind a datasource, as alias=URL or a path
    #[arg(short = 'd', long = "datasource", value_name = "ALIAS=URL")]
    pub datasources: Vec<String>,

    /// Send an HTTP header with a datasource's requests
    #[arg(short = 'H', long = "datasource-header", value_name = "ALIAS=NAME: VALUE")]
    pub headers: Vec<String>,

    /// Timeout for network requests, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout: u64,
}

impl Default for DatasourceArgs {
    fn default() -> Self {
        Self {
            datasources: Vec::new(),
            headers: Vec::new(),
            http_timeout: DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl DatasourceArgs {
    /// Parse the bindings and headers into a ready (unconnected) set.
    pub fn datasources(&self, fs: Arc<dyn FileSystem>, env: Environment) -> Result<Datasources> {
        let bindings = self
            .datasources
            .iter()
            .map(|arg| DatasourceBinding::parse(arg, fs.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let headers = self
            .headers
            .iter()
            .map(|arg| HeaderArg::parse(arg))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let context =
            BackendContext::with_timeout(fs, env, Duration::from_secs(self.http_timeout))?;
        let mut sources = Datasources::new(context);
        for binding in bindings {
            sources.add(binding);
        }

        for header in headers {
            let binding =
                sources
                    .binding_mut(&header.alias)
                    .ok_or_else(|| DatasourceError::UnknownAlias {
                        alias: header.alias.clone(),
                    })?;
            binding.headers.push((header.name, header.value));
        }

        Ok(sources)
    }
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderArgs {
    /// Template text given inline
    #[arg(short = 'i', long = "in", value_name = "TEXT")]
    pub input: Option<String>,

    /// Template file to render (`-` for stdin); repeatable
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub input_files: Vec<String>,

    /// Output file (`-` for stdout); one per template
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub output_files: Vec<String>,

    /// Render every file under a directory
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the mirrored output of --input-dir
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Glob of files to skip in --input-dir; repeatable
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub data: DatasourceArgs,
}

impl RenderArgs {
    /// Input and output selection for the template locator.
    pub fn gather_options(&self) -> GatherOptions {
        GatherOptions {
            input: self.input.clone(),
            input_dir: self.input_dir.clone(),
            input_files: self.input_files.clone(),
            output_dir: self.output_dir.clone(),
            output_files: self.output_files.clone(),
            excludes: self.exclude.clone(),
        }
    }
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FetchArgs {
    /// Datasource alias to resolve
    pub alias: String,

    /// Key or path within the datasource
    #[arg(default_value = "")]
    pub key: String,

    /// Print JSON/YAML content as decoded, pretty-printed JSON
    #[arg(long)]
    pub decode: bool,

    #[command(flatten)]
    pub data: DatasourceArgs,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
