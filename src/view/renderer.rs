//! Sections and layouts on top of [`ViewEngine`].

use crate::config::ViewConfig;
use crate::core::error::{ViewError, ViewResult};
use crate::core::types::Fields;
use crate::view::engine::ViewEngine;
use indexmap::IndexMap;
use minijinja::Value as TemplateValue;
use std::sync::Arc;

/// Context key holding the rendered view inside a layout.
pub const CONTENT_KEY: &str = "content";

/// Context key holding captured sections, e.g. `{{ sections.sidebar }}`.
pub const SECTIONS_KEY: &str = "sections";

/// Renders views, optionally wrapped in a layout.
///
/// Data values are escaped by the template engine. Captured sections and
/// the rendered view body are passed to the layout as safe strings.
#[derive(Debug, Clone)]
pub struct View {
    engine: Arc<ViewEngine>,
    layout: Option<String>,
    sections: IndexMap<String, String>,
    open: Option<(String, String)>,
}

impl View {
    /// Create a view renderer without a layout.
    pub fn new(engine: Arc<ViewEngine>) -> Self {
        Self {
            engine,
            layout: None,
            sections: IndexMap::new(),
            open: None,
        }
    }

    /// Create a renderer from configuration, using its default layout.
    pub fn from_config(config: &ViewConfig) -> Self {
        let mut view = Self::new(Arc::new(ViewEngine::from_config(config)));
        view.layout = config.layout.clone();
        view
    }

    /// The engine templates are rendered with.
    pub fn engine(&self) -> &ViewEngine {
        &self.engine
    }

    /// Wrap subsequent renders in the named layout.
    pub fn set_layout(&mut self, name: impl Into<String>) -> &mut Self {
        self.layout = Some(name.into());
        self
    }

    /// Render without a layout.
    pub fn clear_layout(&mut self) -> &mut Self {
        self.layout = None;
        self
    }

    /// Current layout name.
    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// Begin capturing output into a named section.
    pub fn start_section(&mut self, name: impl Into<String>) -> ViewResult<()> {
        let requested = name.into();
        if let Some((open, _)) = &self.open {
            return Err(ViewError::SectionAlreadyOpen {
                open: open.clone(),
                requested,
            });
        }
        self.open = Some((requested, String::new()));
        Ok(())
    }

    /// Append text to the open section.
    pub fn write(&mut self, text: &str) -> ViewResult<()> {
        match &mut self.open {
            Some((_, buffer)) => {
                buffer.push_str(text);
                Ok(())
            }
            None => Err(ViewError::NoOpenSection),
        }
    }

    /// Close the open section, replacing any earlier content of that name.
    pub fn end_section(&mut self) -> ViewResult<()> {
        let (name, content) = self.open.take().ok_or(ViewError::NoOpenSection)?;
        self.sections.insert(name, content);
        Ok(())
    }

    /// Content of a section, or an empty string if it was never captured.
    pub fn section(&self, name: &str) -> &str {
        self.sections.get(name).map(String::as_str).unwrap_or("")
    }

    /// Render `view` with `data`, wrapping it in the layout if one is set.
    ///
    /// Fields holding no value are left out of the context, so they render
    /// as empty text.
    pub fn render(&self, view: &str, data: &Fields) -> ViewResult<String> {
        let mut context: Vec<(String, TemplateValue)> = data
            .iter()
            .filter(|(_, value)| !value.is_none())
            .map(|(key, value)| (key.clone(), TemplateValue::from_serialize(value)))
            .collect();
        context.push((SECTIONS_KEY.to_string(), self.sections_value()));

        let body = self
            .engine
            .render_view(view, TemplateValue::from_iter(context.iter().cloned()))?;

        match &self.layout {
            None => Ok(body),
            Some(layout) => {
                log::trace!("rendering view '{}' in layout '{}'", view, layout);
                context.push((CONTENT_KEY.to_string(), TemplateValue::from_safe_string(body)));
                self.engine
                    .render_layout(layout, TemplateValue::from_iter(context))
            }
        }
    }

    fn sections_value(&self) -> TemplateValue {
        self.sections
            .iter()
            .map(|(name, content)| {
                (
                    name.clone(),
                    TemplateValue::from_safe_string(content.clone()),
                )
            })
            .collect()
    }
}
