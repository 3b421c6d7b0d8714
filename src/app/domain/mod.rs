//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document and its role / change emissions
//! - State payload and render results
//! - Engine settings
//! - Message types for the engine mailbox

pub mod document;
pub mod messages;
pub mod payload;
pub mod settings;

pub use document::{ContentUpdate, Document, DocumentRole};
pub use messages::Message;
pub use payload::{Diagnostic, RenderResult, StatePayload};
pub use settings::EngineSettings;
