//! View collaborator: file-backed templates with sections and layouts.
//!
//! Templates are rendered with minijinja. Views can either be wrapped in a
//! configured layout, which receives `content` and `sections`, or use
//! `{% extends %}` directly.

pub mod engine;
pub mod renderer;

pub use engine::{ViewEngine, LAYOUT_DIR};
pub use renderer::{View, CONTENT_KEY, SECTIONS_KEY};
