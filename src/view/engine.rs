//! Template environment for views and layouts.

use crate::config::ViewConfig;
use crate::core::error::{ViewError, ViewResult};
use minijinja::{path_loader, Environment, ErrorKind};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Subdirectory of the view root holding layouts.
pub const LAYOUT_DIR: &str = "layouts";

/// Loads and renders templates from a view directory.
///
/// Views live at `root/{name}.{ext}` and layouts at
/// `root/layouts/{name}.{ext}`. Sources are read on first use and kept
/// compiled by the environment. Templates whose file name ends in `.html`,
/// `.htm` or `.xml` are HTML auto-escaped.
pub struct ViewEngine {
    env: Environment<'static>,
    root: PathBuf,
    extension: String,
}

impl ViewEngine {
    /// Create an engine reading templates below `root`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let root = root.into();
        let mut env = Environment::new();
        env.set_loader(path_loader(root.clone()));
        Self {
            env,
            root,
            extension: extension.into(),
        }
    }

    /// Create an engine from configuration.
    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(&config.root, &config.extension)
    }

    /// Directory templates are loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Template name of a view.
    pub fn view_name(&self, name: &str) -> String {
        format!("{}.{}", name, self.extension)
    }

    /// Template name of a layout.
    pub fn layout_name(&self, name: &str) -> String {
        format!("{}/{}.{}", LAYOUT_DIR, name, self.extension)
    }

    /// Register a view from a string instead of a file.
    pub fn add_view(&mut self, name: &str, source: impl Into<String>) -> ViewResult<()> {
        let name = self.view_name(name);
        self.env.add_template_owned(name, source.into())?;
        Ok(())
    }

    /// Register a layout from a string instead of a file.
    pub fn add_layout(&mut self, name: &str, source: impl Into<String>) -> ViewResult<()> {
        let name = self.layout_name(name);
        self.env.add_template_owned(name, source.into())?;
        Ok(())
    }

    /// Render a view with a serializable context.
    pub fn render_view<S: Serialize>(&self, name: &str, context: S) -> ViewResult<String> {
        let template = self.env.get_template(&self.view_name(name)).map_err(|e| {
            not_found(e, || ViewError::NotFound {
                name: name.to_string(),
            })
        })?;
        Ok(template.render(context)?)
    }

    /// Render a layout with a serializable context.
    pub fn render_layout<S: Serialize>(&self, name: &str, context: S) -> ViewResult<String> {
        let template = self.env.get_template(&self.layout_name(name)).map_err(|e| {
            not_found(e, || ViewError::LayoutNotFound {
                name: name.to_string(),
            })
        })?;
        Ok(template.render(context)?)
    }

    /// Forget compiled templates so files are read again.
    pub fn clear(&mut self) {
        self.env.clear_templates();
    }

    /// The underlying environment, e.g. to add filters or globals.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

fn not_found(error: minijinja::Error, missing: impl FnOnce() -> ViewError) -> ViewError {
    if error.kind() == ErrorKind::TemplateNotFound {
        missing()
    } else {
        ViewError::Template(error)
    }
}

impl fmt::Debug for ViewEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEngine")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> (tempfile::TempDir, ViewEngine) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::create_dir_all(dir.path().join("users")).unwrap();
        fs::write(dir.path().join("home.html"), "<p>{{ title }}</p>").unwrap();
        fs::write(dir.path().join("users/list.html"), "<ul></ul>").unwrap();
        fs::write(dir.path().join("notes.txt"), "{{ title }}").unwrap();
        fs::write(dir.path().join("layouts/main.html"), "<body>{{ content }}</body>").unwrap();
        let engine = ViewEngine::new(dir.path(), "html");
        (dir, engine)
    }

    #[test]
    fn test_render_views_and_layouts() {
        let (_dir, engine) = setup();
        let context = minijinja::context! { title => "Tom & Jerry" };

        assert_eq!(
            engine.render_view("home", &context).unwrap(),
            "<p>Tom &amp; Jerry</p>"
        );
        assert_eq!(engine.render_view("users/list", &context).unwrap(), "<ul></ul>");
        assert_eq!(
            engine
                .render_layout("main", minijinja::context! { content => "x" })
                .unwrap(),
            "<body>x</body>"
        );
    }

    #[test]
    fn test_only_html_templates_are_escaped() {
        let (dir, _) = setup();
        let engine = ViewEngine::new(dir.path(), "txt");
        assert_eq!(
            engine
                .render_view("notes", minijinja::context! { title => "a < b" })
                .unwrap(),
            "a < b"
        );
    }

    #[test]
    fn test_missing_templates() {
        let (_dir, engine) = setup();
        assert!(matches!(
            engine.render_view("nope", ()),
            Err(ViewError::NotFound { ref name }) if name == "nope"
        ));
        assert!(matches!(
            engine.render_layout("home", ()),
            Err(ViewError::LayoutNotFound { .. })
        ));
        assert!(matches!(
            engine.render_view("../escape", ()),
            Err(ViewError::NotFound { .. })
        ));
    }

    #[test]
    fn test_syntax_errors_surface() {
        let (_dir, mut engine) = setup();
        assert!(matches!(
            engine.add_view("broken", "{% if %}"),
            Err(ViewError::Template(_))
        ));
    }

    #[test]
    fn test_compiled_templates_are_kept_until_cleared() {
        let (dir, mut engine) = setup();
        engine.render_view("users/list", ()).unwrap();
        fs::write(dir.path().join("users/list.html"), "changed").unwrap();

        assert_eq!(engine.render_view("users/list", ()).unwrap(), "<ul></ul>");

        engine.clear();
        assert_eq!(engine.render_view("users/list", ()).unwrap(), "changed");
    }
}
