//! Shell completions generation.
//!
//! The `stencil completions` command generates shell completion scripts.

use std::io::Write;
use std::sync::Arc;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::vfs::Streams;
use clap::CommandFactory;

use super::dispatcher::{Command, CommandResult};

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    /// Create a new completions command.
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, streams: Arc<dyn Streams>) -> crate::error::Result<CommandResult> {
        let mut cmd = Cli::command();
        let mut stdout = streams.stdout();
        clap_complete::generate(self.args.shell, &mut cmd, "stencil", &mut stdout);
        stdout.flush()?;
        Ok(CommandResult::success())
    }
}
