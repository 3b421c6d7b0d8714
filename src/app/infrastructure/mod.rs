//! Infrastructure layer - runtime plumbing and external integrations.
//!
//! This module contains code that interfaces with the host:
//! - Change bus and timers
//! - Clocks
//! - Location, presentation sink, and editor widget abstractions
//! - Error types

pub mod change_bus;
pub mod clock;
pub mod editor;
pub mod error;
pub mod location;
pub mod scheduler;
pub mod sink;
