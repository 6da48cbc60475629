//! Stencil CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use console::style;
use stencil::cli::{Cli, CommandDispatcher};
use stencil::config::Environment;
use stencil::vfs::{OsFileSystem, ProcessStreams};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
///
/// Logs go to stderr; stdout carries rendered output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("stencil=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stencil=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("Stencil {} starting", env!("CARGO_PKG_VERSION"));

    let dispatcher = CommandDispatcher::new(
        Arc::new(OsFileSystem::new()),
        Arc::new(ProcessStreams),
        Environment::from_process(),
    );

    match dispatcher.dispatch(&cli) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::from(1)
        }
    }
}
