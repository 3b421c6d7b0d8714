use crate::app::infrastructure::change_bus::{ChangeBus, Subscription};

/// Which of the two documents a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentRole {
    /// The data document (JSON with comments).
    Primary,
    /// The template document.
    Secondary,
}

impl DocumentRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "data",
            Self::Secondary => "template",
        }
    }
}

/// One emission on a document's change bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    pub role: DocumentRole,
    pub revision: u64,
    pub content: String,
}

/// An owned text buffer with a revision counter.
///
/// Not `Clone`: the engine owns exactly one instance per role. Other
/// components observe it through [`Document::subscribe`].
pub struct Document {
    role: DocumentRole,
    bus: ChangeBus<ContentUpdate>,
}

impl Document {
    /// Create a document seeded with `content` at revision 0.
    pub fn new(role: DocumentRole, content: impl Into<String>) -> Self {
        Self {
            role,
            bus: ChangeBus::new(ContentUpdate {
                role,
                revision: 0,
                content: content.into(),
            }),
        }
    }

    pub fn role(&self) -> DocumentRole {
        self.role
    }

    pub fn content(&self) -> String {
        self.bus.with(|u| u.content.clone())
    }

    pub fn revision(&self) -> u64 {
        self.bus.with(|u| u.revision)
    }

    pub fn content_eq(&self, text: &str) -> bool {
        self.bus.with(|u| u.content == text)
    }

    /// Replace the content, bump the revision by one and publish.
    pub fn set_content(&mut self, text: impl Into<String>) {
        let revision = self.revision() + 1;
        self.bus.publish(ContentUpdate {
            role: self.role,
            revision,
            content: text.into(),
        });
    }

    /// Observe the document. The callback sees the current content right away.
    pub fn subscribe(&self, callback: impl Fn(&ContentUpdate) + 'static) -> Subscription {
        self.bus.subscribe(callback)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("role", &self.role)
            .field("revision", &self.revision())
            .field("len", &self.bus.with(|u| u.content.len()))
            .finish()
    }
}
