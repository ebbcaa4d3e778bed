//! Models module for the rhythm tokenizer
//!
//! This module contains the data model of an authored percussion
//! composition: sounds, exact beat positions, hits, cycles and the
//! session configuration.

pub mod beat;
pub mod composition;
pub mod config;
pub mod serde_helpers;
pub mod sound;

// Re-export commonly used types
pub use beat::*;
pub use composition::*;
pub use config::*;
pub use sound::{Sound, SYMBOL_TABLE_VERSION};
