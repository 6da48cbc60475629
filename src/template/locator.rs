//! Choosing the input mode and assembling the template set.

use super::loader::{ContentLoader, STDIO};
use super::walker::DirWalker;
use super::{Template, TemplateSet};
use crate::error::{Result, StencilError};
use crate::vfs::{FileSystem, Streams};
use std::path::PathBuf;
use std::sync::Arc;

/// Name given to a template passed inline on the command line.
pub const INLINE_TEMPLATE_NAME: &str = "<arg>";

/// Caller-supplied input and output selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatherOptions {
    /// Inline template text.
    pub input: Option<String>,
    /// Directory of templates to mirror.
    pub input_dir: Option<PathBuf>,
    /// Explicit template files (`-` for standard input).
    pub input_files: Vec<String>,
    /// Directory receiving mirrored output.
    pub output_dir: Option<PathBuf>,
    /// Explicit output files (`-` for standard output).
    pub output_files: Vec<String>,
    /// Glob patterns excluded from a directory walk.
    pub excludes: Vec<String>,
}

/// Where a template's contents come from.
enum Source {
    Inline(String),
    Input(String),
}

impl Source {
    fn name(&self) -> &str {
        match self {
            Self::Inline(_) => INLINE_TEMPLATE_NAME,
            Self::Input(id) => id,
        }
    }
}

/// Produces the ordered, fully-prepared [`TemplateSet`].
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    loader: ContentLoader,
    walker: DirWalker,
}

impl TemplateLocator {
    /// Create a locator over the given filesystem and streams.
    pub fn new(fs: Arc<dyn FileSystem>, streams: Arc<dyn Streams>) -> Self {
        Self {
            walker: DirWalker::new(Arc::clone(&fs)),
            loader: ContentLoader::new(fs, streams),
        }
    }

    /// Gather templates and open their destinations.
    ///
    /// Assembly is all-or-nothing: every source is read and every
    /// destination's directory checked before any destination is opened,
    /// and the first failure aborts the whole set. A destination that
    /// passes the check but still fails to open (permissions, a race)
    /// aborts the set after earlier destinations were truncated.
    pub fn gather(&self, options: &GatherOptions) -> Result<TemplateSet> {
        let (sources, outputs) = self.select(options)?;

        let outputs = if outputs.is_empty() {
            vec![STDIO.to_string()]
        } else {
            outputs
        };

        if sources.len() != outputs.len() {
            return Err(StencilError::configuration(format!(
                "{} template(s) but {} output(s); provide one output per input",
                sources.len(),
                outputs.len()
            )));
        }

        let mut loaded = Vec::with_capacity(sources.len());
        for source in sources {
            let contents = match &source {
                Source::Inline(text) => text.clone(),
                Source::Input(id) => self.loader.read_input(id)?,
            };
            loaded.push((source.name().to_string(), contents));
        }

        for output in &outputs {
            self.loader.check_output(output)?;
        }

        let mut templates = Vec::with_capacity(loaded.len());
        for ((name, contents), output) in loaded.into_iter().zip(outputs) {
            let target = self.loader.open_output(&output)?;
            tracing::debug!("Prepared template {} -> {}", name, output);
            templates.push(Template::new(name, contents, output, target));
        }

        Ok(TemplateSet::from(templates))
    }

    /// Pick the authoritative input mode and the matching outputs.
    fn select(&self, options: &GatherOptions) -> Result<(Vec<Source>, Vec<String>)> {
        if options.output_dir.is_some() && options.input_dir.is_none() {
            return Err(StencilError::configuration(
                "--output-dir requires --input-dir",
            ));
        }

        if let Some(text) = &options.input {
            if options.input_dir.is_some() || !options.input_files.is_empty() {
                tracing::warn!("Inline template given; ignoring other inputs");
            }
            return Ok((
                vec![Source::Inline(text.clone())],
                options.output_files.clone(),
            ));
        }

        if let Some(input_dir) = &options.input_dir {
            let output_dir = options.output_dir.as_ref().ok_or_else(|| {
                StencilError::configuration("--input-dir requires --output-dir")
            })?;
            if !options.output_files.is_empty() {
                tracing::warn!("--input-dir given; ignoring explicit output files");
            }

            let files = self
                .walker
                .walk(input_dir, output_dir, &options.excludes)?;
            let sources = files
                .inputs
                .iter()
                .map(|p| Source::Input(p.display().to_string()))
                .collect();
            let outputs = files
                .outputs
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            return Ok((sources, outputs));
        }

        let inputs = if options.input_files.is_empty() {
            vec![STDIO.to_string()]
        } else {
            options.input_files.clone()
        };
        Ok((
            inputs.into_iter().map(Source::Input).collect(),
            options.output_files.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{MemoryFileSystem, MemoryStreams};

    fn locator(fs: &MemoryFileSystem, streams: &MemoryStreams) -> TemplateLocator {
        TemplateLocator::new(Arc::new(fs.clone()), Arc::new(streams.clone()))
    }

    fn names(set: &TemplateSet) -> Vec<(&str, &str)> {
        set.iter()
            .map(|t| (t.name.as_str(), t.target_name.as_str()))
            .collect()
    }

    #[test]
    fn inline_template_goes_to_stdout() {
        let fs = MemoryFileSystem::new();
        let options = GatherOptions {
            input: Some("hello".into()),
            ..Default::default()
        };

        let set = locator(&fs, &MemoryStreams::new()).gather(&options).unwrap();

        assert_eq!(names(&set), vec![("<arg>", "-")]);
        assert_eq!(set.iter().next().unwrap().contents, "hello");
    }

    #[test]
    fn inline_takes_precedence_over_files() {
        let fs = MemoryFileSystem::new();
        let options = GatherOptions {
            input: Some("inline".into()),
            input_files: vec!["/does/not/exist".into()],
            ..Default::default()
        };

        let set = locator(&fs, &MemoryStreams::new()).gather(&options).unwrap();
        assert_eq!(names(&set), vec![("<arg>", "-")]);
    }

    #[test]
    fn inline_takes_precedence_over_directory() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.txt", "a");
        let options = GatherOptions {
            input: Some("inline".into()),
            input_dir: Some("/in".into()),
            output_dir: Some("/out".into()),
            ..Default::default()
        };

        let set = locator(&fs, &MemoryStreams::new()).gather(&options).unwrap();
        assert_eq!(names(&set), vec![("<arg>", "-")]);
        assert!(!fs.exists("/out"));
    }

    #[test]
    fn no_inputs_reads_stdin() {
        let fs = MemoryFileSystem::new();
        let streams = MemoryStreams::with_stdin("piped");

        let set = locator(&fs, &streams)
            .gather(&GatherOptions::default())
            .unwrap();

        assert_eq!(names(&set), vec![("-", "-")]);
        assert_eq!(set.iter().next().unwrap().contents, "piped");
    }

    #[test]
    fn file_list_pairs_in_order() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/t/one.tmpl", "1");
        fs.add_file("/t/two.tmpl", "2");
        fs.add_dir("/o", 0o755);
        let options = GatherOptions {
            input_files: vec!["/t/two.tmpl".into(), "/t/one.tmpl".into()],
            output_files: vec!["/o/2.txt".into(), "/o/1.txt".into()],
            ..Default::default()
        };

        let set = locator(&fs, &MemoryStreams::new()).gather(&options).unwrap();

        assert_eq!(
            names(&set),
            vec![("/t/two.tmpl", "/o/2.txt"), ("/t/one.tmpl", "/o/1.txt")]
        );
        let contents: Vec<_> = set.iter().map(|t| t.contents.as_str()).collect();
        assert_eq!(contents, vec!["2", "1"]);
    }

    #[test]
    fn directory_mode_mirrors_tree() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.txt", "A");
        fs.add_file("/in/b/c.txt", "C");
        let options = GatherOptions {
            input_dir: Some("/in".into()),
            output_dir: Some("/out".into()),
            ..Default::default()
        };

        let set = locator(&fs, &MemoryStreams::new()).gather(&options).unwrap();

        assert_eq!(
            names(&set),
            vec![("/in/a.txt", "/out/a.txt"), ("/in/b/c.txt", "/out/b/c.txt")]
        );
        assert!(fs.exists("/out/a.txt"));
        assert!(fs.exists("/out/b/c.txt"));
    }

    #[test]
    fn directory_mode_applies_excludes() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.txt", "A");
        fs.add_file("/in/skip.txt", "S");
        let options = GatherOptions {
            input_dir: Some("/in".into()),
            output_dir: Some("/out".into()),
            excludes: vec!["/in/skip*".into()],
            ..Default::default()
        };

        let set = locator(&fs, &MemoryStreams::new()).gather(&options).unwrap();
        assert_eq!(names(&set), vec![("/in/a.txt", "/out/a.txt")]);
        assert!(!fs.exists("/out/skip.txt"));
    }

    #[test]
    fn input_dir_without_output_dir_touches_nothing() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.txt", "A");
        let options = GatherOptions {
            input_dir: Some("/in".into()),
            ..Default::default()
        };

        let err = locator(&fs, &MemoryStreams::new())
            .gather(&options)
            .unwrap_err();

        assert!(matches!(err, StencilError::Configuration { .. }));
        assert!(err.to_string().contains("--output-dir"));
    }

    #[test]
    fn output_dir_without_input_dir_is_rejected() {
        let fs = MemoryFileSystem::new();
        let options = GatherOptions {
            input: Some("x".into()),
            output_dir: Some("/out".into()),
            ..Default::default()
        };

        let err = locator(&fs, &MemoryStreams::new())
            .gather(&options)
            .unwrap_err();
        assert!(matches!(err, StencilError::Configuration { .. }));
        assert!(!fs.exists("/out"));
    }

    #[test]
    fn default_stdout_requires_single_template() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a", "a");
        fs.add_file("/b", "b");
        let options = GatherOptions {
            input_files: vec!["/a".into(), "/b".into()],
            ..Default::default()
        };

        let err = locator(&fs, &MemoryStreams::new())
            .gather(&options)
            .unwrap_err();
        assert!(matches!(err, StencilError::Configuration { .. }));
    }

    #[test]
    fn mismatched_counts_open_no_outputs() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a", "a");
        let options = GatherOptions {
            input_files: vec!["/a".into()],
            output_files: vec!["/x".into(), "/y".into()],
            ..Default::default()
        };

        assert!(locator(&fs, &MemoryStreams::new()).gather(&options).is_err());
        assert!(!fs.exists("/x"));
        assert!(!fs.exists("/y"));
    }

    #[test]
    fn unreadable_source_opens_no_outputs() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a", "a");
        let options = GatherOptions {
            input_files: vec!["/a".into(), "/missing".into()],
            output_files: vec!["/out-a".into(), "/out-b".into()],
            ..Default::default()
        };

        let err = locator(&fs, &MemoryStreams::new())
            .gather(&options)
            .unwrap_err();

        assert!(matches!(err, StencilError::Read { .. }));
        assert!(err.to_string().contains("/missing"));
        assert!(!fs.exists("/out-a"));
        assert!(!fs.exists("/out-b"));
    }

    #[test]
    fn bad_later_destination_leaves_earlier_untouched() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/t/one.tmpl", "1");
        fs.add_file("/t/two.tmpl", "2");
        fs.add_file("/o/1.txt", "keep me");
        let options = GatherOptions {
            input_files: vec!["/t/one.tmpl".into(), "/t/two.tmpl".into()],
            output_files: vec!["/o/1.txt".into(), "/missing/2.txt".into()],
            ..Default::default()
        };

        let err = locator(&fs, &MemoryStreams::new())
            .gather(&options)
            .unwrap_err();

        assert!(matches!(err, StencilError::Write { .. }));
        assert!(err.to_string().contains("/missing/2.txt"));
        assert_eq!(fs.contents("/o/1.txt").as_deref(), Some("keep me"));
    }

    #[test]
    fn unopenable_destination_fails_whole_set() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a", "a");
        let options = GatherOptions {
            input_files: vec!["/a".into()],
            output_files: vec!["/missing-dir/out".into()],
            ..Default::default()
        };

        let err = locator(&fs, &MemoryStreams::new())
            .gather(&options)
            .unwrap_err();
        assert!(matches!(err, StencilError::Write { .. }));
    }
}
