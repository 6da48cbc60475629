//! Template discovery for Stencil.
//!
//! This module decides *what* gets rendered and *where* it goes:
//! - [`TemplateLocator`] picks the input mode and pairs sources with targets
//! - [`DirWalker`] mirrors an input directory tree into an output tree
//! - [`ContentLoader`] reads sources and opens destinations
//! - [`Renderer`] is the seam to the rendering engine
//!
//! # Input Mode Precedence
//!
//! Exactly one input mode is used (first match wins):
//! 1. Inline template string
//! 2. Input directory (requires an output directory)
//! 3. Explicit file list (defaults to standard input)
//!
//! # Example
//!
//! ```
//! use stencil::template::{GatherOptions, TemplateLocator};
//! use stencil::vfs::{MemoryFileSystem, MemoryStreams};
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new();
//! fs.add_file("/in/a.txt", "A");
//! fs.add_file("/in/b/c.txt", "C");
//!
//! let locator = TemplateLocator::new(Arc::new(fs.clone()), Arc::new(MemoryStreams::new()));
//! let options = GatherOptions {
//!     input_dir: Some("/in".into()),
//!     output_dir: Some("/out".into()),
//!     ..Default::default()
//! };
//! let templates = locator.gather(&options).unwrap();
//!
//! let targets: Vec<_> = templates.iter().map(|t| t.target_name.as_str()).collect();
//! assert_eq!(targets, vec!["/out/a.txt", "/out/b/c.txt"]);
//! ```

pub mod loader;
pub mod locator;
pub mod render;
pub mod walker;

pub use loader::{ContentLoader, STDIO};
pub use locator::{GatherOptions, TemplateLocator, INLINE_TEMPLATE_NAME};
pub use render::{render_all, Renderer, VerbatimRenderer};
pub use walker::{DirWalker, ExcludeSet, WalkedFiles};

use std::fmt;
use std::io::Write;

/// A template source paired with its opened destination.
pub struct Template {
    /// Source identifier (a path, `-`, or `<arg>` for inline templates).
    pub name: String,
    /// Raw template text.
    pub contents: String,
    /// Destination identifier (a path or `-`).
    pub target_name: String,
    target: Box<dyn Write + Send>,
}

impl Template {
    /// Pair loaded contents with an opened destination.
    pub fn new(
        name: impl Into<String>,
        contents: impl Into<String>,
        target_name: impl Into<String>,
        target: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            target_name: target_name.into(),
            target,
        }
    }

    /// The opened destination stream.
    pub fn target(&mut self) -> &mut (dyn Write + Send) {
        self.target.as_mut()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("contents_len", &self.contents.len())
            .field("target_name", &self.target_name)
            .finish()
    }
}

/// Templates in input enumeration order.
#[derive(Debug, Default)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterate over templates in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    /// Iterate mutably over templates in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Template> {
        self.templates.iter_mut()
    }
}

impl From<Vec<Template>> for TemplateSet {
    fn from(templates: Vec<Template>) -> Self {
        Self { templates }
    }
}

impl IntoIterator for TemplateSet {
    type Item = Template;
    type IntoIter = std::vec::IntoIter<Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.into_iter()
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}
