//! Stateless encode/decode operations for the WASM API
//!
//! - `encodeComposition`: composition JSON → token strings
//! - `decodeTokens`: token strings → composition (strict)
//! - `salvageTokens`: raw model output → composition + skipped beat count

use wasm_bindgen::prelude::*;

use crate::api::helpers::{config_from_js, deserialize, js_error, serialize, strings_to_array};
use crate::models::Composition;
use crate::tokenizer::{decode_strs, salvage, Encoder};
use crate::{wasm_info, wasm_warn};

/// Encode a composition (array of `{id, hits|markers}` cycles)
#[wasm_bindgen(js_name = encodeComposition)]
pub fn encode_composition(composition: JsValue, config: JsValue) -> Result<js_sys::Array, JsValue> {
    let composition: Composition = deserialize(composition, "Invalid composition")?;
    let config = config_from_js(config)?;

    wasm_info!("encodeComposition: {} cycles", composition.len());

    let encoder = Encoder::new(config).map_err(js_error)?;
    let tokens = encoder.encode(&composition).map_err(js_error)?;
    Ok(strings_to_array(tokens.to_strings()))
}

/// Encode a composition straight to the transport payload `{"tokens": [...]}`
#[wasm_bindgen(js_name = encodePayload)]
pub fn encode_payload(composition: JsValue, config: JsValue) -> Result<String, JsValue> {
    let composition: Composition = deserialize(composition, "Invalid composition")?;
    let config = config_from_js(config)?;

    let tokens = Encoder::new(config)
        .and_then(|encoder| encoder.encode(&composition))
        .map_err(js_error)?;
    tokens.to_payload_json().map_err(js_error)
}

/// Strictly decode token strings into a composition
#[wasm_bindgen(js_name = decodeTokens)]
pub fn decode_tokens(tokens: JsValue, n_beats: u32) -> Result<JsValue, JsValue> {
    let tokens: Vec<String> = deserialize(tokens, "Tokens must be an array of strings")?;
    let composition = decode_strs(&tokens, n_beats).map_err(js_error)?;
    serialize(&composition, "Failed to serialize composition")
}

/// Leniently decode model output
#[wasm_bindgen(js_name = salvageTokens)]
pub fn salvage_tokens(tokens: JsValue, n_beats: u32) -> Result<JsValue, JsValue> {
    let tokens: Vec<String> = deserialize(tokens, "Tokens must be an array of strings")?;
    let salvaged = salvage(&tokens, n_beats).map_err(js_error)?;
    if salvaged.skipped_beats > 0 {
        wasm_warn!("salvageTokens skipped {} beats", salvaged.skipped_beats);
    }
    serialize(&salvaged, "Failed to serialize salvaged composition")
}
