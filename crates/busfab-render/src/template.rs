//! `%token-name%` placeholder templates.
//!
//! A template is parsed once into literal text and token slots; unknown
//! placeholders are rejected at parse time, missing fragments at render
//! time. `%%` stands for a literal percent sign.

use std::fs;
use std::path::Path;

use tracing::debug;

use busfab_core::{RenderUnit, Token, UnitKind};

use crate::error::{RenderError, Result};
use crate::render::{OutputFormat, RenderedFile, Renderer};

const REGISTER_FILE_TEMPLATE: &str = include_str!("../templates/regfile.vhd");
const FABRIC_TEMPLATE: &str = include_str!("../templates/fabric.vhd");

/// File names looked up by [`TemplateRenderer::from_dir`].
pub const REGISTER_FILE_TEMPLATE_NAME: &str = "regfile.vhd";
pub const FABRIC_TEMPLATE_NAME: &str = "fabric.vhd";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Token),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut line = 1;
        let mut rest = source;

        while let Some(pos) = rest.find('%') {
            text.push_str(&rest[..pos]);
            line += rest[..pos].matches('\n').count();
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('%') {
                text.push('%');
                rest = tail;
                continue;
            }

            let end = after
                .find(|c: char| c == '%' || c == '\n')
                .filter(|&i| after.as_bytes()[i] == b'%')
                .ok_or(RenderError::UnterminatedPlaceholder { line })?;
            let name = &after[..end];
            let token = Token::parse(name).ok_or_else(|| RenderError::UnknownPlaceholder {
                name: name.to_string(),
                line,
            })?;

            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Slot(token));
            rest = &after[end + 1..];
        }
        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { segments })
    }

    /// Tokens referenced by the template, in order of first use.
    pub fn placeholders(&self) -> Vec<Token> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(token) = segment {
                if !seen.contains(token) {
                    seen.push(*token);
                }
            }
        }
        seen
    }

    /// Substitute the unit's fragments into the template.
    pub fn render(&self, unit: &RenderUnit) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(token) => {
                    let fragment =
                        unit.tokens
                            .get(*token)
                            .ok_or_else(|| RenderError::MissingToken {
                                unit: unit.name.clone(),
                                token: token.name().to_string(),
                            })?;
                    out.push_str(fragment);
                }
            }
        }
        Ok(out)
    }
}

/// Renders units into VHDL through one template per unit kind.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    register_file: Template,
    fabric: Template,
}

impl TemplateRenderer {
    /// The built-in templates.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            register_file: Template::parse(REGISTER_FILE_TEMPLATE)?,
            fabric: Template::parse(FABRIC_TEMPLATE)?,
        })
    }

    /// Built-in templates, overridden by `regfile.vhd` / `fabric.vhd` found
    /// in `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut renderer = Self::builtin()?;
        if let Some(t) = load_override(dir, REGISTER_FILE_TEMPLATE_NAME)? {
            renderer.register_file = t;
        }
        if let Some(t) = load_override(dir, FABRIC_TEMPLATE_NAME)? {
            renderer.fabric = t;
        }
        Ok(renderer)
    }

    pub fn template(&self, kind: UnitKind) -> &Template {
        match kind {
            UnitKind::RegisterFile => &self.register_file,
            UnitKind::Fabric => &self.fabric,
        }
    }
}

fn load_override(dir: &Path, name: &str) -> Result<Option<Template>> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let source = fs::read_to_string(&path).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "using template override");
    Template::parse(&source).map(Some)
}

impl Renderer for TemplateRenderer {
    fn render(&self, unit: &RenderUnit) -> Result<RenderedFile> {
        let contents = self.template(unit.kind).render(unit)?;
        Ok(RenderedFile {
            unit: unit.name.clone(),
            file_name: format!("{}.vhd", unit.name),
            contents,
        })
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Vhdl
    }
}
