//! Command-line interface for Stencil.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations. It is a thin driver: flags become
//! [`GatherOptions`](crate::template::GatherOptions) and datasource
//! bindings, and the work happens in [`template`](crate::template) and
//! [`datasource`](crate::datasource).
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, DatasourceArgs, FetchArgs, RenderArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
