//! The `fetch` command.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::FetchArgs;
use crate::config::Environment;
use crate::error::Result;
use crate::vfs::{FileSystem, Streams};

/// Resolves one alias and writes the content to standard output.
pub struct FetchCommand {
    fs: Arc<dyn FileSystem>,
    env: Environment,
    args: FetchArgs,
}

impl FetchCommand {
    /// Create a new fetch command.
    pub fn new(fs: Arc<dyn FileSystem>, env: Environment, args: FetchArgs) -> Self {
        Self { fs, env, args }
    }
}

impl Command for FetchCommand {
    fn execute(&self, streams: Arc<dyn Streams>) -> Result<CommandResult> {
        let sources = self
            .args
            .data
            .datasources(Arc::clone(&self.fs), self.env.clone())?;
        let fetched = sources.resolve(&self.args.alias, &self.args.key)?;
        tracing::debug!(
            "Fetched {} bytes of {} from '{}'",
            fetched.content.len(),
            fetched.content_type,
            self.args.alias
        );

        let output = if self.args.decode {
            let value = fetched.decode()?;
            let mut pretty = serde_json::to_string_pretty(&value)
                .context("Failed to format decoded content")?;
            pretty.push('\n');
            pretty
        } else {
            fetched.content
        };

        let mut stdout = streams.stdout();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(CommandResult::success())
    }
}
