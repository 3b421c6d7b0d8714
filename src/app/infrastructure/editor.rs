use std::collections::HashMap;

use crate::app::domain::settings::EngineSettings;
use crate::app::services::text_ops::{self, EditOutcome};

/// Primitives the engine needs from a text editing widget.
pub trait TextEditorWidget {
    fn full_text(&self) -> String;

    /// Replace the byte range `from..to` with `text`.
    fn replace_range(&mut self, from: usize, to: usize, text: &str);

    /// Install the callback invoked with the full text after every change.
    fn set_on_change(&mut self, callback: Box<dyn FnMut(&str)>);
}

/// Commands reachable through key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    InsertTab,
    IndentMore,
    IndentLess,
}

/// Key chord → command overrides. Chords use the `Ctrl-]` notation.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, EditCommand>,
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, chord: &str, command: EditCommand) {
        self.bindings.insert(chord.to_string(), command);
    }

    pub fn lookup(&self, chord: &str) -> Option<EditCommand> {
        self.bindings.get(chord).copied()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        keymap.bind("Tab", EditCommand::InsertTab);
        keymap.bind("Ctrl-]", EditCommand::IndentMore);
        keymap.bind("Ctrl-[", EditCommand::IndentLess);
        keymap
    }
}

/// In-memory editing widget with a single selection.
pub struct BufferEditor {
    text: String,
    anchor: usize,
    head: usize,
    tab_size: usize,
    keymap: Keymap,
    on_change: Option<Box<dyn FnMut(&str)>>,
}

impl BufferEditor {
    pub fn new(text: impl Into<String>, tab_size: usize) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            anchor: end,
            head: end,
            tab_size: tab_size.max(1),
            keymap: Keymap::default(),
            on_change: None,
        }
    }

    /// Editor indenting by the configured `tab_size`.
    pub fn from_settings(text: impl Into<String>, settings: &EngineSettings) -> Self {
        Self::new(text, settings.tab_size)
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.anchor, self.head)
    }

    /// Positions are clamped to the text and snapped back to a char boundary.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.anchor = self.snap(anchor);
        self.head = self.snap(head);
    }

    /// Type `text` over the current selection.
    pub fn type_text(&mut self, text: &str) {
        let (from, to) = self.ordered_selection();
        self.replace_range(from, to, text);
        let cursor = from + text.len();
        self.anchor = cursor;
        self.head = cursor;
    }

    /// Run the command bound to `chord`. Returns false if nothing is bound.
    pub fn handle_key(&mut self, chord: &str) -> bool {
        match self.keymap.lookup(chord) {
            Some(command) => {
                self.run(command);
                true
            }
            None => false,
        }
    }

    pub fn run(&mut self, command: EditCommand) {
        let outcome = match command {
            EditCommand::InsertTab => {
                text_ops::insert_tab(&self.text, self.anchor, self.head, self.tab_size)
            }
            EditCommand::IndentMore => {
                text_ops::indent_more(&self.text, self.anchor, self.head, self.tab_size)
            }
            EditCommand::IndentLess => {
                text_ops::indent_less(&self.text, self.anchor, self.head, self.tab_size)
            }
        };
        self.apply(outcome);
    }

    fn apply(&mut self, outcome: EditOutcome) {
        let changed = outcome.text != self.text;
        self.text = outcome.text;
        self.anchor = outcome.anchor;
        self.head = outcome.head;
        if changed {
            self.emit_change();
        }
    }

    fn ordered_selection(&self) -> (usize, usize) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    fn snap(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn emit_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.text);
        }
    }
}

impl TextEditorWidget for BufferEditor {
    fn full_text(&self) -> String {
        self.text.clone()
    }

    fn replace_range(&mut self, from: usize, to: usize, text: &str) {
        let from = self.snap(from);
        let to = self.snap(to).max(from);
        if self.text[from..to] == *text {
            return;
        }
        self.text.replace_range(from..to, text);

        let inserted_end = from + text.len();
        let map = |pos: usize| {
            if pos < from {
                pos
            } else if pos >= to {
                pos - (to - from) + text.len()
            } else {
                inserted_end
            }
        };
        self.anchor = map(self.anchor);
        self.head = map(self.head);
        self.emit_change();
    }

    fn set_on_change(&mut self, callback: Box<dyn FnMut(&str)>) {
        self.on_change = Some(callback);
    }
}
