//! Template renderer for busfab.
//!
//! Consumes the token maps the generators produce and turns each
//! [`RenderUnit`](busfab_core::RenderUnit) into a file. The renderer makes no
//! structural decisions: every fragment arrives finished.
//!
//! - [`TemplateRenderer`]: substitutes `%token-name%` placeholders in the
//!   built-in (or user-supplied) VHDL templates
//! - [`JsonRenderer`]: dumps the token map as pretty JSON

pub mod error;
pub mod json;
pub mod render;
pub mod template;

pub use error::{RenderError, Result};
pub use json::JsonRenderer;
pub use render::{renderer_for, write_files, OutputFormat, RenderedFile, Renderer};
pub use template::{Template, TemplateRenderer};
