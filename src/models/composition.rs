//! Composition model: hits, cycles and the composition itself
//!
//! A `Composition` is the unit of serialization. Cycles are appended one at a
//! time and can only be deleted afterwards; their hits keep insertion order and
//! are sorted by beat only when the emitter needs them.

use serde::{Deserialize, Serialize};

use crate::errors::TokenizerError;
use crate::models::beat::Beat;
use crate::models::serde_helpers::fraction;
use crate::models::sound::Sound;

/// A sound placed at an exact beat position
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HitEvent {
    #[serde(with = "fraction")]
    pub beat: Beat,
    pub sound: Sound,
}

impl HitEvent {
    pub fn new(beat: Beat, sound: Sound) -> Self {
        Self { beat, sound }
    }
}

/// Creation identifier of a cycle, unique within one composition
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct CycleId(pub u32);

/// One repetition of the rhythmic grid
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Cycle {
    #[serde(default)]
    pub id: CycleId,
    #[serde(alias = "markers")]
    pub hits: Vec<HitEvent>,
}

impl Cycle {
    pub fn new(id: CycleId, hits: Vec<HitEvent>) -> Self {
        Self { id, hits }
    }

    /// Hits sorted by beat; ties keep insertion order
    pub fn sorted_hits(&self) -> Vec<&HitEvent> {
        let mut hits: Vec<&HitEvent> = self.hits.iter().collect();
        hits.sort_by(|a, b| a.beat.cmp(&b.beat));
        hits
    }
}

/// An ordered sequence of cycles
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "Vec<Cycle>", into = "Vec<Cycle>")]
pub struct Composition {
    cycles: Vec<Cycle>,
    next_id: u32,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cycle built from `hits` and return its identifier
    pub fn append_cycle(&mut self, hits: Vec<HitEvent>) -> CycleId {
        let id = CycleId(self.next_id);
        self.next_id += 1;
        self.cycles.push(Cycle::new(id, hits));
        id
    }

    /// Remove and return the cycle at `index`
    pub fn delete_cycle(&mut self, index: usize) -> Result<Cycle, TokenizerError> {
        if index >= self.cycles.len() {
            return Err(TokenizerError::IndexOutOfRange {
                index,
                len: self.cycles.len(),
            });
        }
        Ok(self.cycles.remove(index))
    }

    /// Remove every cycle and restart identifiers from zero
    pub fn clear(&mut self) {
        self.cycles.clear();
        self.next_id = 0;
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cycle> {
        self.cycles.iter()
    }

    /// Total number of hits across all cycles
    pub fn hit_count(&self) -> usize {
        self.cycles.iter().map(|c| c.hits.len()).sum()
    }
}

impl From<Vec<Cycle>> for Composition {
    fn from(cycles: Vec<Cycle>) -> Self {
        let next_id = cycles
            .iter()
            .map(|c| c.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { cycles, next_id }
    }
}

impl From<Composition> for Vec<Cycle> {
    fn from(composition: Composition) -> Self {
        composition.cycles
    }
}

impl<'a> IntoIterator for &'a Composition {
    type Item = &'a Cycle;
    type IntoIter = std::slice::Iter<'a, Cycle>;

    fn into_iter(self) -> Self::IntoIter {
        self.cycles.iter()
    }
}
