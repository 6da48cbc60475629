//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::config::Environment;
use crate::error::Result;
use crate::vfs::{FileSystem, Streams};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `streams` - Standard input/output used for rendered and fetched content
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] carrying the exit code.
    fn execute(&self, streams: Arc<dyn Streams>) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Exit code to use (0 for success).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Dispatches CLI commands to their implementations.
///
/// Holds the process-wide filesystem, streams and environment, fixed once
/// at startup and handed to each command.
#[derive(Debug)]
pub struct CommandDispatcher {
    fs: Arc<dyn FileSystem>,
    streams: Arc<dyn Streams>,
    env: Environment,
}

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new(fs: Arc<dyn FileSystem>, streams: Arc<dyn Streams>, env: Environment) -> Self {
        Self { fs, streams, env }
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        let streams = Arc::clone(&self.streams);
        match &cli.command {
            Some(Commands::Render(args)) => {
                let cmd = super::render::RenderCommand::new(
                    Arc::clone(&self.fs),
                    self.env.clone(),
                    args.clone(),
                );
                cmd.execute(streams)
            }
            Some(Commands::Fetch(args)) => {
                let cmd = super::fetch::FetchCommand::new(
                    Arc::clone(&self.fs),
                    self.env.clone(),
                    args.clone(),
                );
                cmd.execute(streams)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(streams)
            }
            None => {
                // Bare flags render
                let cmd = super::render::RenderCommand::new(
                    Arc::clone(&self.fs),
                    self.env.clone(),
                    cli.render.clone(),
                );
                cmd.execute(streams)
            }
        }
    }
}
