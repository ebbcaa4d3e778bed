//! Token emission
//!
//! Walks cycles → beats → positions and writes the canonical grammar:
//!
//! ```text
//! <SOC> ( <SOB> SUBD_n ( POS_l HIT_x+ ){n} <EOB> ){n_beats} <EOC>
//! ```
//!
//! The output is a pure function of the composition and the configuration.

use num_traits::CheckedSub;

use crate::errors::TokenizerError;
use crate::models::{is_within_cycle, Beat, Composition, Cycle, HitEvent, Sound, TokenizerConfig};
use crate::tokenizer::resolver::{Unresolved, MODEL_MAX_SUBDIVISION};
use crate::tokenizer::token::{Token, TokenStream};

/// Serializes compositions into token streams under one configuration
#[derive(Clone, Debug)]
pub struct Encoder {
    config: TokenizerConfig,
}

impl Encoder {
    pub fn new(config: TokenizerConfig) -> Result<Self, TokenizerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Encode every cycle of `composition`, in order
    pub fn encode(&self, composition: &Composition) -> Result<TokenStream, TokenizerError> {
        if composition.is_empty() {
            return Err(TokenizerError::EmptyComposition);
        }

        let mut out = TokenStream::new();
        for (index, cycle) in composition.iter().enumerate() {
            self.encode_cycle(index, cycle, &mut out)?;
        }

        log::debug!(
            "Encoded {} cycles ({} hits) into {} tokens",
            composition.len(),
            composition.hit_count(),
            out.len()
        );

        Ok(out)
    }

    /// Append the tokens for one cycle; `index` is only used in errors
    pub fn encode_cycle(
        &self,
        index: usize,
        cycle: &Cycle,
        out: &mut TokenStream,
    ) -> Result<(), TokenizerError> {
        let n_beats = self.config.n_beats;

        if let Some(bad) = cycle.hits.iter().find(|h| !is_within_cycle(&h.beat, n_beats)) {
            log::error!("Cycle {} holds a hit outside the cycle: {}", index, bad.beat);
            return Err(TokenizerError::InvalidBeat {
                beat: bad.beat,
                n_beats,
            });
        }

        let hits = cycle.sorted_hits();

        out.push(Token::StartOfCycle);
        for beat_index in 0..n_beats {
            let start = Beat::from_integer(i64::from(beat_index));
            let end = start + Beat::from_integer(1);

            // `hits` is sorted, so the beat's hits form one contiguous run
            let lo = hits.partition_point(|h| h.beat < start);
            let hi = hits.partition_point(|h| h.beat < end);
            let in_beat = &hits[lo..hi];

            self.encode_beat(index, beat_index, in_beat, out)?;
        }
        out.push(Token::EndOfCycle);

        Ok(())
    }

    fn encode_beat(
        &self,
        cycle_index: usize,
        beat_index: u32,
        in_beat: &[&HitEvent],
        out: &mut TokenStream,
    ) -> Result<(), TokenizerError> {
        let start = Beat::from_integer(i64::from(beat_index));
        let offsets = in_beat
            .iter()
            .map(|h| {
                h.beat
                    .checked_sub(&start)
                    .ok_or(TokenizerError::PrecisionOverflow { beat: h.beat })
            })
            .collect::<Result<Vec<Beat>, TokenizerError>>()?;

        let subdivision = self
            .config
            .policy
            .resolve(&offsets, self.config.max_subdivision)
            .map_err(|reason| match reason {
                Unresolved::OffGrid => TokenizerError::Unrepresentable {
                    cycle: cycle_index,
                    beat_index,
                    max: self.config.max_subdivision,
                },
                Unresolved::TooFine { required } => TokenizerError::SubdivisionTooFine {
                    cycle: cycle_index,
                    beat_index,
                    required,
                    max: MODEL_MAX_SUBDIVISION,
                },
                Unresolved::Overflow { beat: offset } => {
                    // Report the hit's absolute beat, not its offset
                    let beat = in_beat
                        .iter()
                        .zip(&offsets)
                        .find(|(_, o)| **o == offset)
                        .map_or(offset, |(h, _)| h.beat);
                    TokenizerError::PrecisionOverflow { beat }
                }
            })?;

        out.push(Token::StartOfBeat);
        out.push(Token::Subdivision(subdivision));

        let mut placed = 0usize;
        for position in 0..subdivision {
            out.push(Token::Position(position));

            let current = Beat::new(i64::from(position), i64::from(subdivision));
            let mut matched = false;
            let on_position = offsets.iter().zip(in_beat).filter(|(offset, _)| **offset == current);
            for (_, hit) in on_position {
                out.push(Token::Hit(hit.sound));
                matched = true;
                placed += 1;
            }
            if !matched {
                out.push(Token::Hit(Sound::Silence));
            }
        }

        out.push(Token::EndOfBeat);

        if placed < in_beat.len() {
            log::warn!(
                "Cycle {}, beat {}: {} of {} hits fall between the {} positions and are written as silence",
                cycle_index,
                beat_index,
                in_beat.len() - placed,
                in_beat.len(),
                subdivision
            );
        }

        Ok(())
    }
}

/// Encode `composition` under `config`
pub fn encode(composition: &Composition, config: &TokenizerConfig) -> Result<TokenStream, TokenizerError> {
    Encoder::new(config.clone())?.encode(composition)
}
