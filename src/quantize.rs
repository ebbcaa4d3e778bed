//! Beat quantization
//!
//! Converts raw pointer input into a beat position on the configured snap
//! grid. The cycle boundary is position 0, never `n_beats`.

use num_traits::{CheckedDiv, CheckedMul};
use std::f64::consts::TAU;

use crate::errors::TokenizerError;
use crate::models::{beat_to_f64, is_within_cycle, Beat, TokenizerConfig};

/// Snaps raw beats onto a fixed grid within one cycle
#[derive(Clone, Debug, PartialEq)]
pub struct Quantizer {
    n_beats: u32,
    snap: Beat,
}

impl Quantizer {
    pub fn new(n_beats: u32, snap: Beat) -> Result<Self, TokenizerError> {
        if n_beats == 0 {
            return Err(TokenizerError::InvalidConfig(
                "n_beats must be a positive integer".to_string(),
            ));
        }
        if snap <= Beat::from_integer(0) {
            return Err(TokenizerError::InvalidConfig(format!(
                "snap must be positive, got {}",
                snap
            )));
        }
        Ok(Self { n_beats, snap })
    }

    pub fn from_config(config: &TokenizerConfig) -> Result<Self, TokenizerError> {
        Self::new(config.n_beats, config.snap)
    }

    pub fn n_beats(&self) -> u32 {
        self.n_beats
    }

    pub fn snap(&self) -> Beat {
        self.snap
    }

    /// `round(raw / snap) * snap`, wrapping `n_beats` to 0
    pub fn quantize(&self, raw: Beat) -> Result<Beat, TokenizerError> {
        let overflow = || TokenizerError::PrecisionOverflow { beat: raw };
        let steps = raw.checked_div(&self.snap).ok_or_else(overflow)?.round();
        self.wrap(steps.checked_mul(&self.snap).ok_or_else(overflow)?)
    }

    /// Quantize a floating-point raw beat. The step count is rounded in
    /// floating point, the resulting position is exact.
    pub fn quantize_f64(&self, raw: f64) -> Result<Beat, TokenizerError> {
        if !raw.is_finite() {
            return Err(TokenizerError::NonFiniteInput(raw));
        }
        let steps = (raw / beat_to_f64(&self.snap)).round();
        // Anything beyond i64 is far outside any cycle anyway
        if steps.abs() > i64::MAX as f64 / 2.0 {
            return Err(TokenizerError::NonFiniteInput(raw));
        }
        Beat::from_integer(steps as i64)
            .checked_mul(&self.snap)
            .ok_or(TokenizerError::NonFiniteInput(raw))
            .and_then(|beat| self.wrap(beat))
    }

    /// Quantize a pointer angle in radians, measured from the top of the
    /// cycle circle. Full turns are ignored.
    pub fn angle_to_beat(&self, angle: f64) -> Result<Beat, TokenizerError> {
        if !angle.is_finite() {
            return Err(TokenizerError::NonFiniteInput(angle));
        }
        let angle = angle.rem_euclid(TAU);
        let raw = (TAU - angle) / TAU * f64::from(self.n_beats);
        self.quantize_f64(raw)
    }

    /// Inverse of `angle_to_beat`, for renderers
    pub fn beat_to_angle(&self, beat: &Beat) -> f64 {
        TAU - beat_to_f64(beat) / f64::from(self.n_beats) * TAU
    }

    fn wrap(&self, beat: Beat) -> Result<Beat, TokenizerError> {
        let beat = if beat == Beat::from_integer(i64::from(self.n_beats)) {
            Beat::from_integer(0)
        } else {
            beat
        };

        if !is_within_cycle(&beat, self.n_beats) {
            return Err(TokenizerError::InvalidBeat {
                beat,
                n_beats: self.n_beats,
            });
        }
        Ok(beat)
    }
}

/// One-shot quantization of `raw` onto a `snap` grid within an `n_beats` cycle
pub fn quantize(raw: Beat, snap: Beat, n_beats: u32) -> Result<Beat, TokenizerError> {
    Quantizer::new(n_beats, snap)?.quantize(raw)
}
