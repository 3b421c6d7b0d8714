use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::app::domain::payload::{Diagnostic, RenderResult};
use crate::app::services::relaxed_json;
use crate::app::services::temporal::TemporalContext;

/// Soft size budget shown next to the location length. Never enforced.
pub const STATUS_BUDGET: usize = 2000;

/// Renders template text against a data value.
pub trait TemplateEngine {
    fn render(&self, template: &str, context: &Value) -> Result<String, String>;
}

/// Logic-less Mustache: sections, inverted sections, `{{.}}`, set-delimiter
/// tags. Missing names render empty and `{{x}}` is HTML-escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MustacheEngine;

impl TemplateEngine for MustacheEngine {
    fn render(&self, template: &str, context: &Value) -> Result<String, String> {
        let compiled = mustache::compile_str(template).map_err(|e| e.to_string())?;
        let mut out = Vec::new();
        compiled
            .render(&mut out, context)
            .map_err(|e| e.to_string())?;
        String::from_utf8(out).map_err(|e| e.to_string())
    }
}

/// Turns the two documents into preview text or diagnostics.
pub struct RenderPipeline {
    engine: Box<dyn TemplateEngine>,
    pretty_indent: usize,
}

impl RenderPipeline {
    pub fn new(pretty_indent: usize) -> Self {
        Self::with_engine(Box::new(MustacheEngine), pretty_indent)
    }

    pub fn with_engine(engine: Box<dyn TemplateEngine>, pretty_indent: usize) -> Self {
        Self {
            engine,
            pretty_indent,
        }
    }

    /// Render against the current wall-clock time.
    pub fn render(&self, data_text: &str, template_text: &str) -> RenderResult {
        self.render_at(data_text, template_text, Utc::now())
    }

    /// Render with `now`/`utcnow` computed from `at`.
    ///
    /// A parse failure stops the cycle before any rendering is attempted.
    /// User keys named `now` or `utcnow` are overwritten.
    pub fn render_at(
        &self,
        data_text: &str,
        template_text: &str,
        at: DateTime<Utc>,
    ) -> RenderResult {
        let mut diagnostics = Vec::new();

        let mut data = match relaxed_json::parse(data_text) {
            Ok(value) => value,
            Err(e) => {
                diagnostics.push(Diagnostic::Parse(e.to_string()));
                return RenderResult::Err(diagnostics);
            }
        };

        inject_temporal_context(&mut data, at);

        let output = if template_text.trim().is_empty() {
            Some(relaxed_json::serialize(&data, self.pretty_indent))
        } else {
            match self.engine.render(template_text, &data) {
                Ok(rendered) => Some(rendered),
                Err(e) => {
                    diagnostics.push(Diagnostic::Template(e));
                    None
                }
            }
        };

        match output {
            Some(text) if diagnostics.is_empty() => RenderResult::Ok(text),
            _ => RenderResult::Err(diagnostics),
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(2)
    }
}

/// `now` holds local wall-clock time and `utcnow` holds UTC.
fn inject_temporal_context(data: &mut Value, at: DateTime<Utc>) {
    let Value::Object(map) = data else {
        return;
    };
    // serde_json::to_value on a plain string-only struct cannot fail
    if let (Ok(local), Ok(utc)) = (
        serde_json::to_value(TemporalContext::local(at)),
        serde_json::to_value(TemporalContext::utc(at)),
    ) {
        map.insert("now".to_string(), local);
        map.insert("utcnow".to_string(), utc);
    }
}

/// Status line for the size of the full location string.
pub fn status_text(href: &str) -> String {
    format!("{} out of {}", href.chars().count(), STATUS_BUDGET)
}
