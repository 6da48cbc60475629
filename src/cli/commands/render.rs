//! The `render` command.

use std::sync::Arc;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::RenderArgs;
use crate::config::Environment;
use crate::error::Result;
use crate::template::{render_all, Renderer, TemplateLocator, VerbatimRenderer};
use crate::vfs::{FileSystem, Streams};

/// Gathers templates and renders each to its destination.
pub struct RenderCommand {
    fs: Arc<dyn FileSystem>,
    env: Environment,
    args: RenderArgs,
    renderer: Box<dyn Renderer>,
}

impl RenderCommand {
    /// Create a new render command using [`VerbatimRenderer`].
    pub fn new(fs: Arc<dyn FileSystem>, env: Environment, args: RenderArgs) -> Self {
        Self {
            fs,
            env,
            args,
            renderer: Box::new(VerbatimRenderer),
        }
    }

    /// Render with a different engine.
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }
}

impl Command for RenderCommand {
    fn execute(&self, streams: Arc<dyn Streams>) -> Result<CommandResult> {
        // Bindings are checked up front so a bad -d fails before any output opens
        let sources = self
            .args
            .data
            .datasources(Arc::clone(&self.fs), self.env.clone())?;
        tracing::debug!("Bound datasources: {:?}", sources.aliases());

        let locator = TemplateLocator::new(Arc::clone(&self.fs), streams);
        let templates = locator.gather(&self.args.gather_options())?;
        tracing::info!("Rendering {} template(s)", templates.len());

        render_all(templates, self.renderer.as_ref(), &sources)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::Datasources;
    use crate::error::StencilError;
    use crate::vfs::{MemoryFileSystem, MemoryStreams};
    use std::io::Write;
    use std::path::PathBuf;

    /// Each line of the template names an alias whose content is written.
    struct AliasPerLine;

    impl Renderer for AliasPerLine {
        fn render(
            &self,
            _name: &str,
            contents: &str,
            sources: &Datasources,
            out: &mut dyn Write,
        ) -> anyhow::Result<()> {
            for alias in contents.lines() {
                out.write_all(sources.resolve(alias, "")?.content.as_bytes())?;
            }
            Ok(())
        }
    }

    fn run(fs: &MemoryFileSystem, streams: &MemoryStreams, args: RenderArgs) -> Result<CommandResult> {
        RenderCommand::new(Arc::new(fs.clone()), Environment::new(), args)
            .execute(Arc::new(streams.clone()))
    }

    #[test]
    fn renders_stdin_to_stdout_by_default() {
        let fs = MemoryFileSystem::new();
        let streams = MemoryStreams::with_stdin("from stdin");

        run(&fs, &streams, RenderArgs::default()).unwrap();

        assert_eq!(streams.output(), "from stdin");
    }

    #[test]
    fn renders_directory_tree() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.txt", "A");
        fs.add_file("/in/b/c.txt", "C");
        let args = RenderArgs {
            input_dir: Some(PathBuf::from("/in")),
            output_dir: Some(PathBuf::from("/out")),
            ..Default::default()
        };

        run(&fs, &MemoryStreams::new(), args).unwrap();

        assert_eq!(fs.contents("/out/a.txt").as_deref(), Some("A"));
        assert_eq!(fs.contents("/out/b/c.txt").as_deref(), Some("C"));
    }

    #[test]
    fn bad_datasource_fails_before_output() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/t.tmpl", "x");
        let mut args = RenderArgs {
            input_files: vec!["/t.tmpl".into()],
            output_files: vec!["/t.out".into()],
            ..Default::default()
        };
        args.data.datasources = vec!["data=".into()];

        let err = run(&fs, &MemoryStreams::new(), args).unwrap_err();

        assert!(matches!(err, StencilError::Datasource(_)));
        assert!(!fs.exists("/t.out"));
    }

    #[test]
    fn configuration_error_propagates() {
        let fs = MemoryFileSystem::new();
        let args = RenderArgs {
            input_dir: Some(PathBuf::from("/in")),
            ..Default::default()
        };
        let err = run(&fs, &MemoryStreams::new(), args).unwrap_err();
        assert!(matches!(err, StencilError::Configuration { .. }));
    }

    #[test]
    fn renderer_sees_bound_datasources() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/user.txt", "alice");
        fs.add_file("/data/host.txt", "@db");
        let mut args = RenderArgs {
            input: Some("user\nhost".into()),
            ..Default::default()
        };
        args.data.datasources = vec!["user=/data/user.txt".into(), "/data/host.txt".into()];
        let streams = MemoryStreams::new();

        RenderCommand::new(Arc::new(fs.clone()), Environment::new(), args)
            .with_renderer(Box::new(AliasPerLine))
            .execute(Arc::new(streams.clone()))
            .unwrap();

        assert_eq!(streams.output(), "alice@db");
    }
}
