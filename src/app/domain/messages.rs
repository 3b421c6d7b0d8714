use super::document::DocumentRole;

/// Everything that can be posted to the engine's mailbox.
/// Document subscriptions and editor bindings send these; `SyncEngine::pump`
/// handles them on the engine's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A document published new content.
    ContentChanged { role: DocumentRole, revision: u64 },

    /// The editing widget for `role` now holds `text`.
    LocalEdit { role: DocumentRole, text: String },

    /// The location changed out-of-band (back/forward, pasted link).
    Navigated,
}
