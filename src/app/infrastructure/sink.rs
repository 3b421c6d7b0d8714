/// Where rendered previews, diagnostics and the size status end up.
///
/// Output is handed over verbatim; the engine never escapes it.
pub trait PresentationSink {
    fn show_output(&mut self, output: &str);
    fn show_diagnostics(&mut self, diagnostics: &str);
    fn show_status(&mut self, status: &str);
}

/// What a [`RecordingSink`] currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Nothing,
    Output(String),
    Diagnostics(String),
}

/// Sink that keeps what is on screen plus a count of updates.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    pub shown: Shown,
    pub status: String,
    pub presentations: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            shown: Shown::Nothing,
            status: String::new(),
            presentations: 0,
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for RecordingSink {
    fn show_output(&mut self, output: &str) {
        self.shown = Shown::Output(output.to_string());
        self.presentations += 1;
    }

    fn show_diagnostics(&mut self, diagnostics: &str) {
        self.shown = Shown::Diagnostics(diagnostics.to_string());
        self.presentations += 1;
    }

    fn show_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}
