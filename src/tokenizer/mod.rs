//! Rhythm tokenizer
//!
//! Serializes a composition into the flat token vocabulary consumed by the
//! generative sequence model, and parses model output back.
//!
//! # Module Structure
//!
//! - **token**: the token vocabulary and `TokenStream`
//! - **resolver**: per-beat subdivision policies
//! - **emitter**: composition → tokens
//! - **decoder**: tokens → composition (strict and lenient)

pub mod decoder;
pub mod emitter;
pub mod resolver;
pub mod token;

pub use decoder::{decode, decode_strs, salvage, Salvaged};
pub use emitter::{encode, Encoder};
pub use resolver::{SubdivisionPolicy, Unresolved, DEFAULT_SUBDIVISION, MODEL_MAX_SUBDIVISION};
pub use token::{Token, TokenStream, UnknownToken};
