use crate::app::domain::document::Document;
use crate::app::infrastructure::error::CodecError;
use crate::app::services::hash_codec::HashCodec;

use super::typing::TypingStateTracker;

/// What a navigation event did to the documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The user was typing; the event was dropped without decoding.
    Suppressed,
    /// The fragment did not decode; nothing changed.
    Rejected(CodecError),
    Applied {
        data_changed: bool,
        template_changed: bool,
    },
}

/// Applies out-of-band location changes to the documents when it is safe.
///
/// Local edits always win: while the tracker reports typing, navigation is
/// ignored. Otherwise only fields whose text differs are written, so an
/// unchanged document keeps its revision and emits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationGuard;

impl NavigationGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        typing: &TypingStateTracker,
        codec: &HashCodec,
        fragment: &str,
        data: &mut Document,
        template: &mut Document,
    ) -> NavigationOutcome {
        if typing.is_typing() {
            return NavigationOutcome::Suppressed;
        }

        let payload = match codec.decode(fragment) {
            Ok(payload) => payload,
            Err(e) => return NavigationOutcome::Rejected(e),
        };

        let data_changed = apply_if_different(data, payload.data_text);
        let template_changed = apply_if_different(template, payload.template_text);

        NavigationOutcome::Applied {
            data_changed,
            template_changed,
        }
    }
}

fn apply_if_different(doc: &mut Document, text: String) -> bool {
    if doc.content_eq(&text) {
        return false;
    }
    doc.set_content(text);
    true
}
