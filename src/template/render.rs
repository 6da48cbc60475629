//! The seam between gathered templates and a rendering engine.

use super::{Template, TemplateSet};
use crate::datasource::Datasources;
use crate::error::Result;
use anyhow::Context;
use std::io::Write;

/// Renders one template's text into a destination.
///
/// The template language itself lives behind this trait. Data lookups made
/// while rendering go through `sources`, which holds every bound alias.
pub trait Renderer {
    /// Render `contents` (from the template named `name`) into `out`.
    fn render(
        &self,
        name: &str,
        contents: &str,
        sources: &Datasources,
        out: &mut dyn Write,
    ) -> anyhow::Result<()>;
}

/// Writes template contents through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimRenderer;

impl Renderer for VerbatimRenderer {
    fn render(
        &self,
        _name: &str,
        contents: &str,
        _sources: &Datasources,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        out.write_all(contents.as_bytes())?;
        Ok(())
    }
}

impl Template {
    /// Render this template into its destination and flush it.
    pub fn render_with(&mut self, renderer: &dyn Renderer, sources: &Datasources) -> Result<()> {
        renderer
            .render(&self.name, &self.contents, sources, self.target.as_mut())
            .and_then(|()| self.target.flush().map_err(Into::into))
            .with_context(|| format!("Failed to render {} to {}", self.name, self.target_name))?;
        Ok(())
    }
}

/// Render every template in order, stopping at the first failure.
///
/// Callers hand over a set that [`TemplateLocator::gather`] fully prepared,
/// so no destination is touched unless the whole set assembled.
///
/// [`TemplateLocator::gather`]: super::TemplateLocator::gather
pub fn render_all(
    templates: TemplateSet,
    renderer: &dyn Renderer,
    sources: &Datasources,
) -> Result<()> {
    for mut template in templates {
        template.render_with(renderer, sources)?;
    }
    Ok(())
}
