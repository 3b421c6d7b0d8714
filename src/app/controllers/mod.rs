//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the host:
//! - Render / persist debouncing
//! - Typing state tracking
//! - Navigation reconciliation
//! - Preview rendering
//! - Editor widget binding

pub mod binding;
pub mod debounce;
pub mod navigation;
pub mod preview;
pub mod typing;
