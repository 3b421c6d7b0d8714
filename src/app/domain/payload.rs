use thiserror::Error;

/// Snapshot of both documents at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatePayload {
    pub data_text: String,
    pub template_text: String,
}

impl StatePayload {
    pub fn new(data_text: impl Into<String>, template_text: impl Into<String>) -> Self {
        Self {
            data_text: data_text.into(),
            template_text: template_text.into(),
        }
    }
}

/// A problem found while producing a preview. Shown instead of output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Template error: {0}")]
    Template(String),
}

/// Outcome of one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Ok(String),
    Err(Vec<Diagnostic>),
}

impl RenderResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, RenderResult::Ok(_))
    }

    /// Text to display: the output, or the diagnostics one per line.
    pub fn display_text(&self) -> String {
        match self {
            RenderResult::Ok(output) => output.clone(),
            RenderResult::Err(diagnostics) => diagnostics
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
