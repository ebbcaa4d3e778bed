//! Authoring session exposed to JavaScript
//!
//! One `RhythmSession` per page; the page owns it and passes nothing
//! through globals.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{config_from_js, js_error, serialize, strings_to_array};
use crate::models::Sound;
use crate::session::AuthoringSession;
use crate::{wasm_info, wasm_log};

#[wasm_bindgen]
pub struct RhythmSession {
    inner: AuthoringSession,
}

#[wasm_bindgen]
impl RhythmSession {
    /// Create a session; `config` may be omitted for the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<RhythmSession, JsValue> {
        let config = config_from_js(config)?;
        wasm_info!(
            "RhythmSession created: n_beats={}, snap={}, policy={:?}",
            config.n_beats,
            config.snap,
            config.policy
        );
        let inner = AuthoringSession::new(config).map_err(js_error)?;
        Ok(RhythmSession { inner })
    }

    #[wasm_bindgen(js_name = nBeats)]
    pub fn n_beats(&self) -> u32 {
        self.inner.config().n_beats
    }

    /// Toggle a marker at a raw beat position
    #[wasm_bindgen(js_name = toggleMarker)]
    pub fn toggle_marker(&mut self, beat: f64, sound: &str) -> Result<JsValue, JsValue> {
        let sound: Sound = sound.parse().map_err(js_error)?;
        let change = self.inner.toggle_marker_f64(beat, sound).map_err(js_error)?;
        wasm_log!("toggleMarker({}, {}) -> {:?}", beat, sound, change);
        serialize(&change, "Failed to serialize marker change")
    }

    /// Toggle a marker at a pointer angle (radians from the top of the circle)
    #[wasm_bindgen(js_name = toggleMarkerAtAngle)]
    pub fn toggle_marker_at_angle(&mut self, angle: f64, sound: &str) -> Result<JsValue, JsValue> {
        let sound: Sound = sound.parse().map_err(js_error)?;
        let change = self.inner.toggle_marker_at_angle(angle, sound).map_err(js_error)?;
        serialize(&change, "Failed to serialize marker change")
    }

    /// Angle at which a renderer should draw `beat`
    #[wasm_bindgen(js_name = beatToAngle)]
    pub fn beat_to_angle(&self, beat: &str) -> Result<f64, JsValue> {
        let beat = crate::models::parse_fraction(beat).map_err(js_error)?;
        Ok(self.inner.quantizer().beat_to_angle(&beat))
    }

    #[wasm_bindgen(js_name = clearMarkers)]
    pub fn clear_markers(&mut self) -> usize {
        self.inner.clear_markers()
    }

    pub fn markers(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.markers(), "Failed to serialize markers")
    }

    /// Commit the current markers as a cycle; returns its id
    #[wasm_bindgen(js_name = appendCycle)]
    pub fn append_cycle(&mut self) -> Result<u32, JsValue> {
        let id = self.inner.append_cycle().map_err(js_error)?;
        Ok(id.0)
    }

    #[wasm_bindgen(js_name = deleteCycle)]
    pub fn delete_cycle(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.delete_cycle(index).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = clearComposition)]
    pub fn clear_composition(&mut self) {
        self.inner.clear_composition();
    }

    #[wasm_bindgen(js_name = cycleCount)]
    pub fn cycle_count(&self) -> usize {
        self.inner.composition().len()
    }

    pub fn composition(&self) -> Result<JsValue, JsValue> {
        serialize(self.inner.composition(), "Failed to serialize composition")
    }

    /// Encode and clear the composition; returns the token strings
    pub fn submit(&mut self) -> Result<js_sys::Array, JsValue> {
        let tokens = self.inner.submit().map_err(js_error)?;
        wasm_info!("submit produced {} tokens", tokens.len());
        Ok(strings_to_array(tokens.to_strings()))
    }
}
