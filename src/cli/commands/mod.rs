//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`stencil render`, `stencil fetch`)
//! - Rendering by default when only flags are given
//! - Filesystem, streams and environment injected once at startup

pub mod completions;
pub mod dispatcher;
pub mod fetch;
pub mod render;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
