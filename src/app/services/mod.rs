//! Services layer - business operations and utilities.
//!
//! This module contains stateless operations:
//! - Location fragment encoding
//! - Comment-tolerant JSON
//! - Temporal context for templates
//! - Editing commands

pub mod hash_codec;
pub mod relaxed_json;
pub mod temporal;
pub mod text_ops;
