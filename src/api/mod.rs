//! Rhythm tokenizer WASM API
//!
//! This module provides the JavaScript-facing API for the authoring page.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, error handling, and logging
//! - `session`: `RhythmSession`, the per-page authoring session
//! - `codec`: Stateless encode/decode functions

pub mod codec;
pub mod helpers;
pub mod session;

// Re-export all public functions from modules to maintain a flat public API
pub use codec::{decode_tokens, encode_composition, encode_payload, salvage_tokens};
pub use session::RhythmSession;
