//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, payload, settings, messages)
//! - `controllers/` - Orchestration (debounce, typing state, navigation, preview, editor binding)
//! - `services/` - Pure operations (hash codec, relaxed JSON, temporal context, text ops)
//! - `infrastructure/` - Runtime plumbing (change bus, timers, clock, location,
//!   sink, editor widget, errors)
//! - `state.rs` - The synchronization engine tying it all together

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::debounce::Pulse;
pub use controllers::navigation::NavigationOutcome;
pub use controllers::preview::RenderPipeline;
pub use domain::{
    ContentUpdate, Diagnostic, Document, DocumentRole, EngineSettings, Message, RenderResult,
    StatePayload,
};
pub use infrastructure::error::{AppError, CodecError};
pub use services::hash_codec::HashCodec;
pub use state::SyncEngine;
