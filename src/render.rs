//! Document Rendering
//!
//! [`DocumentRenderer`] is the seam between the document models produced by
//! the builder and the text written to disk. [`RstRenderer`] renders
//! reStructuredText through a Handlebars registry built once per run.

use handlebars::{
    no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use include_dir::{include_dir, Dir};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::builder::{IndexDoc, ProtocolDoc, RecordDoc};
use crate::error::Result;
use crate::protocol::EnumSummary;

static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]+").expect("slug pattern is valid"));

pub const RECORD_TEMPLATE: &str = "record";
pub const ENUM_TEMPLATE: &str = "enum";
pub const PROTOCOL_TEMPLATE: &str = "protocol";
pub const INDEX_TEMPLATE: &str = "index";

/// Turns document models into text
pub trait DocumentRenderer {
    fn render_record(&self, doc: &RecordDoc) -> Result<String>;
    fn render_enum(&self, doc: &EnumSummary) -> Result<String>;
    fn render_protocol(&self, doc: &ProtocolDoc) -> Result<String>;
    fn render_index(&self, doc: &IndexDoc) -> Result<String>;
}

/// reStructuredText renderer backed by the embedded templates
pub struct RstRenderer {
    registry: Handlebars<'static>,
}

impl RstRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry.register_helper("slug", Box::new(slug_helper));
        registry.register_helper("underline", Box::new(underline_helper));

        for file in TEMPLATES.files() {
            if let (Some(name), Some(source)) = (template_name(file.path()), file.contents_utf8()) {
                registry
                    .register_template_string(&name, source)
                    .map_err(Box::new)?;
            }
        }

        Ok(Self { registry })
    }

    /// Embedded templates, with any `*.hbs` file in `dir` replacing the
    /// template of the same name
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut renderer = Self::new()?;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e != "hbs").unwrap_or(true) {
                continue;
            }
            if let Some(name) = template_name(&path) {
                debug!(template = %name, path = %path.display(), "overriding template");
                let source = fs::read_to_string(&path)?;
                renderer.register(&name, &source)?;
            }
        }
        Ok(renderer)
    }

    /// Register or replace a single template
    pub fn register(&mut self, name: &str, source: &str) -> Result<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(Box::new)?;
        Ok(())
    }

    fn render<T: serde::Serialize>(&self, template: &str, data: &T) -> Result<String> {
        Ok(self.registry.render(template, data)?)
    }
}

impl DocumentRenderer for RstRenderer {
    fn render_record(&self, doc: &RecordDoc) -> Result<String> {
        self.render(RECORD_TEMPLATE, doc)
    }

    fn render_enum(&self, doc: &EnumSummary) -> Result<String> {
        self.render(ENUM_TEMPLATE, doc)
    }

    fn render_protocol(&self, doc: &ProtocolDoc) -> Result<String> {
        self.render(PROTOCOL_TEMPLATE, doc)
    }

    fn render_index(&self, doc: &IndexDoc) -> Result<String> {
        self.render(INDEX_TEMPLATE, doc)
    }
}

/// `record.rst.hbs` -> `record`
fn template_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.split('.').next()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Anchor-safe form of a link: `com.x.Role#user_id` -> `com-x-role-user_id`
pub fn slug(text: &str) -> String {
    SLUG_RE
        .replace_all(&text.trim().to_lowercase(), "-")
        .into_owned()
}

// Handlebars helpers

fn slug_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&slug(param))?;
    Ok(())
}

/// RST section underline as long as the title: `{{underline title "="}}`
fn underline_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    let marker = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("underline", 1))?;
    out.write(&marker.repeat(text.chars().count().max(1)))?;
    Ok(())
}
