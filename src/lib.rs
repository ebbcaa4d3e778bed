//! Rhythm Tokenizer WASM Module
//!
//! Serializes percussion compositions authored on the rhythm circle into the
//! token stream consumed by the generative sequence model, and parses model
//! output back into compositions.

pub mod errors;
pub mod models;
pub mod quantize;
pub mod session;
pub mod tokenizer;
pub mod api;

// Re-export commonly used types
pub use errors::{DecodeError, TokenizerError};
pub use models::{Beat, Composition, Cycle, CycleId, HitEvent, Sound, TokenizerConfig};
pub use quantize::Quantizer;
pub use session::{AuthoringSession, MarkerChange};
pub use tokenizer::{decode, encode, salvage, Encoder, SubdivisionPolicy, Token, TokenStream};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second init (module re-instantiated on the same page) keeps the first logger
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Rhythm tokenizer WASM module initialized");
}
