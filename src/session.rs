//! Authoring session
//!
//! Owns everything a user edits before submitting: the markers of the cycle
//! being drawn and the composition built from committed cycles. One session
//! per user; nothing here is shared between sessions.

use serde::Serialize;

use crate::errors::TokenizerError;
use crate::models::serde_helpers::fraction;
use crate::models::{Beat, Composition, Cycle, CycleId, HitEvent, Sound, TokenizerConfig};
use crate::quantize::Quantizer;
use crate::tokenizer::{Encoder, TokenStream};

/// Outcome of toggling a marker
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "change", content = "beat", rename_all = "lowercase")]
pub enum MarkerChange {
    Added(#[serde(with = "fraction")] Beat),
    Removed(#[serde(with = "fraction")] Beat),
}

#[derive(Debug, Clone)]
pub struct AuthoringSession {
    quantizer: Quantizer,
    encoder: Encoder,
    markers: Vec<HitEvent>,
    composition: Composition,
}

impl AuthoringSession {
    pub fn new(config: TokenizerConfig) -> Result<Self, TokenizerError> {
        let quantizer = Quantizer::from_config(&config)?;
        let encoder = Encoder::new(config)?;
        Ok(Self {
            quantizer,
            encoder,
            markers: Vec::new(),
            composition: Composition::new(),
        })
    }

    pub fn config(&self) -> &TokenizerConfig {
        self.encoder.config()
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Markers of the cycle being drawn, in placement order
    pub fn markers(&self) -> &[HitEvent] {
        &self.markers
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Quantize `raw` and toggle a marker there: an existing marker at that
    /// exact position is removed, otherwise `sound` is placed
    pub fn toggle_marker(&mut self, raw: Beat, sound: Sound) -> Result<MarkerChange, TokenizerError> {
        let beat = self.quantizer.quantize(raw)?;
        Ok(self.toggle_at(beat, sound))
    }

    pub fn toggle_marker_f64(&mut self, raw: f64, sound: Sound) -> Result<MarkerChange, TokenizerError> {
        let beat = self.quantizer.quantize_f64(raw)?;
        Ok(self.toggle_at(beat, sound))
    }

    pub fn toggle_marker_at_angle(&mut self, angle: f64, sound: Sound) -> Result<MarkerChange, TokenizerError> {
        let beat = self.quantizer.angle_to_beat(angle)?;
        Ok(self.toggle_at(beat, sound))
    }

    fn toggle_at(&mut self, beat: Beat, sound: Sound) -> MarkerChange {
        match self.markers.iter().position(|m| m.beat == beat) {
            Some(index) => {
                self.markers.remove(index);
                log::debug!("Removed marker at beat {}", beat);
                MarkerChange::Removed(beat)
            }
            None => {
                self.markers.push(HitEvent::new(beat, sound));
                log::debug!("Added {} marker at beat {}", sound, beat);
                MarkerChange::Added(beat)
            }
        }
    }

    /// Remove all markers; returns how many there were
    pub fn clear_markers(&mut self) -> usize {
        let count = self.markers.len();
        self.markers.clear();
        count
    }

    /// Commit the current markers as a new cycle. Markers stay in place so
    /// the next cycle can start from a copy of this one.
    pub fn append_cycle(&mut self) -> Result<CycleId, TokenizerError> {
        if self.markers.is_empty() {
            return Err(TokenizerError::EmptyCycle);
        }
        let id = self.composition.append_cycle(self.markers.clone());
        log::info!(
            "Appended cycle {:?} ({} markers); composition has {} cycles",
            id,
            self.markers.len(),
            self.composition.len()
        );
        Ok(id)
    }

    pub fn delete_cycle(&mut self, index: usize) -> Result<Cycle, TokenizerError> {
        let cycle = self.composition.delete_cycle(index)?;
        log::info!("Deleted cycle {} ({:?})", index, cycle.id);
        Ok(cycle)
    }

    pub fn clear_composition(&mut self) {
        self.composition.clear();
    }

    /// Move the composition out, clear the working buffer, then encode.
    ///
    /// The buffer is cleared even if encoding fails.
    pub fn submit(&mut self) -> Result<TokenStream, TokenizerError> {
        if self.composition.is_empty() {
            return Err(TokenizerError::EmptyComposition);
        }

        let composition = std::mem::take(&mut self.composition);
        log::info!("Submitting {} cycles", composition.len());

        self.encoder.encode(&composition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AuthoringSession {
        AuthoringSession::new(TokenizerConfig::new(2, Beat::new(1, 2))).unwrap()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut s = session();
        assert_eq!(
            s.toggle_marker(Beat::new(2, 5), Sound::Doom).unwrap(),
            MarkerChange::Added(Beat::new(1, 2))
        );
        assert_eq!(s.markers().len(), 1);

        // Different raw input that quantizes to the same position
        assert_eq!(
            s.toggle_marker_f64(0.6, Sound::Pa2).unwrap(),
            MarkerChange::Removed(Beat::new(1, 2))
        );
        assert!(s.markers().is_empty());
    }

    #[test]
    fn test_append_requires_markers() {
        let mut s = session();
        assert_eq!(s.append_cycle(), Err(TokenizerError::EmptyCycle));
    }

    #[test]
    fn test_append_keeps_markers() {
        let mut s = session();
        s.toggle_marker(Beat::from_integer(0), Sound::Doom).unwrap();
        assert_eq!(s.append_cycle().unwrap(), CycleId(0));
        assert_eq!(s.append_cycle().unwrap(), CycleId(1));
        assert_eq!(s.markers().len(), 1);
        assert_eq!(s.composition().len(), 2);
    }

    #[test]
    fn test_submit_clears_composition() {
        let mut s = session();
        s.toggle_marker(Beat::from_integer(0), Sound::Doom).unwrap();
        s.append_cycle().unwrap();

        let tokens = s.submit().unwrap();
        assert!(!tokens.is_empty());
        assert!(s.composition().is_empty());
        assert_eq!(s.submit(), Err(TokenizerError::EmptyComposition));

        // Identifiers restart after submission
        assert_eq!(s.append_cycle().unwrap(), CycleId(0));
    }

    #[test]
    fn test_marker_change_serialization() {
        let json = serde_json::to_string(&MarkerChange::Added(Beat::new(3, 2))).unwrap();
        assert_eq!(json, r#"{"change":"added","beat":"3/2"}"#);
    }
}
