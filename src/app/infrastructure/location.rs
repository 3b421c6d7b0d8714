/// The navigable address that carries persisted state in its fragment.
pub trait Location {
    /// Current fragment without the leading `#`.
    fn fragment(&self) -> String;

    /// Replace the fragment. Implementations record a history entry when the
    /// value actually changes.
    fn set_fragment(&mut self, fragment: &str);

    /// The full address string, including the fragment.
    fn href(&self) -> String;
}

/// In-memory location with browser-like history.
///
/// `set_fragment` pushes a new entry and truncates any forward history;
/// `back`/`forward`/`navigate_to` model the out-of-band navigations the host
/// reports to the engine.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    base: String,
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryLocation {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_fragment(base, "")
    }

    pub fn with_fragment(base: impl Into<String>, fragment: &str) -> Self {
        Self {
            base: strip_fragment(&base.into()).to_string(),
            entries: vec![fragment.trim_start_matches('#').to_string()],
            cursor: 0,
        }
    }

    /// Step back one history entry. Returns false at the oldest entry.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward one history entry. Returns false at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Externally driven navigation, e.g. a pasted link.
    pub fn navigate_to(&mut self, fragment: &str) {
        self.set_fragment(fragment);
    }

    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn set_fragment(&mut self, fragment: &str) {
        let fragment = fragment.trim_start_matches('#');
        if self.entries[self.cursor] == fragment {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_string());
        self.cursor += 1;
    }

    fn href(&self) -> String {
        let fragment = &self.entries[self.cursor];
        if fragment.is_empty() {
            self.base.clone()
        } else {
            format!("{}#{}", self.base, fragment)
        }
    }
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map(|(base, _)| base).unwrap_or(url)
}
