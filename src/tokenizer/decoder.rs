//! Token stream → composition
//!
//! `decode` is the strict inverse of the emitter: any deviation from the
//! grammar is an error. `salvage` is for model output, which is usually cut
//! off mid-cycle and occasionally malformed; it keeps every complete,
//! well-formed beat and counts the rest.
//!
//! Silence is not recoverable: `HIT_S` and an empty position decode to the
//! same thing (no hit).

use serde::Serialize;

use crate::errors::DecodeError;
use crate::models::{Beat, Composition, HitEvent, Sound};
use crate::tokenizer::resolver::MODEL_MAX_SUBDIVISION;
use crate::tokenizer::token::{
    Token, END_OF_BEAT, END_OF_CYCLE, HIT_PREFIX, POSITION_PREFIX, START_OF_BEAT, START_OF_CYCLE,
    SUBDIVISION_PREFIX,
};

/// Largest legacy `HIT_<symbol>_<k>` suffix the lenient parser strips
const MAX_HIT_SUFFIX: u32 = 8;

/// Parse a full token stream into a composition of `n_beats`-beat cycles
pub fn decode(tokens: &[Token], n_beats: u32) -> Result<Composition, DecodeError> {
    if n_beats == 0 {
        return Err(DecodeError::InvalidConfig(
            "n_beats must be a positive integer".to_string(),
        ));
    }

    let mut cursor = Cursor { tokens, index: 0 };
    let mut composition = Composition::new();

    while !cursor.at_end() {
        let cycle_index = composition.len();
        cursor.expect(Token::StartOfCycle, "<SOC>")?;

        let mut hits = Vec::new();
        for beat_index in 0..n_beats {
            match cursor.next("<SOB>")? {
                Token::StartOfBeat => {}
                Token::EndOfCycle => {
                    return Err(DecodeError::BeatCountMismatch {
                        cycle: cycle_index,
                        expected: n_beats,
                        found: beat_index,
                    })
                }
                other => return Err(cursor.unexpected("<SOB>", other)),
            }
            decode_beat(&mut cursor, beat_index, &mut hits)?;
        }

        match cursor.next("<EOC>")? {
            Token::EndOfCycle => {}
            Token::StartOfBeat => {
                return Err(DecodeError::BeatCountMismatch {
                    cycle: cycle_index,
                    expected: n_beats,
                    found: n_beats + 1,
                })
            }
            other => return Err(cursor.unexpected("<EOC>", other)),
        }

        composition.append_cycle(hits);
    }

    log::debug!(
        "Decoded {} tokens into {} cycles",
        tokens.len(),
        composition.len()
    );

    Ok(composition)
}

/// Parse token text, then `decode`
pub fn decode_strs<S: AsRef<str>>(tokens: &[S], n_beats: u32) -> Result<Composition, DecodeError> {
    let parsed = tokens
        .iter()
        .enumerate()
        .map(|(index, text)| {
            text.as_ref()
                .parse::<Token>()
                .map_err(|e| DecodeError::UnknownToken { index, token: e.0 })
        })
        .collect::<Result<Vec<Token>, DecodeError>>()?;

    decode(&parsed, n_beats)
}

/// After `<SOB>`: `SUBD_n (POS_l HIT_x+){n} <EOB>`
fn decode_beat(
    cursor: &mut Cursor<'_>,
    beat_index: u32,
    hits: &mut Vec<HitEvent>,
) -> Result<(), DecodeError> {
    let subdivision = match cursor.next("SUBD_<n>")? {
        Token::Subdivision(n) if n > 0 => n,
        other => return Err(cursor.unexpected("SUBD_<n> with n > 0", other)),
    };

    let start = Beat::from_integer(i64::from(beat_index));
    for position in 0..subdivision {
        match cursor.next("POS_<l>")? {
            Token::Position(l) if l == position => {}
            other => return Err(cursor.unexpected(&format!("POS_{}", position), other)),
        }

        let beat = start + Beat::new(i64::from(position), i64::from(subdivision));
        let mut any = false;
        while let Some(Token::Hit(sound)) = cursor.peek() {
            cursor.index += 1;
            any = true;
            if !sound.is_silence() {
                hits.push(HitEvent::new(beat, sound));
            }
        }
        if !any {
            return match cursor.peek() {
                Some(other) => Err(unexpected_at(cursor.index, "HIT_<symbol>", other)),
                None => Err(DecodeError::UnexpectedEnd {
                    expected: "HIT_<symbol>".to_string(),
                }),
            };
        }
    }

    match cursor.next("<EOB>")? {
        Token::EndOfBeat => Ok(()),
        other => Err(cursor.unexpected("<EOB>", other)),
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.index).copied()
    }

    fn next(&mut self, expected: &str) -> Result<Token, DecodeError> {
        let token = self.peek().ok_or_else(|| DecodeError::UnexpectedEnd {
            expected: expected.to_string(),
        })?;
        self.index += 1;
        Ok(token)
    }

    fn expect(&mut self, wanted: Token, expected: &str) -> Result<(), DecodeError> {
        match self.next(expected)? {
            token if token == wanted => Ok(()),
            other => Err(self.unexpected(expected, other)),
        }
    }

    /// Error for `found`, the token `next` just returned
    fn unexpected(&self, expected: &str, found: Token) -> DecodeError {
        unexpected_at(self.index.saturating_sub(1), expected, found)
    }
}

fn unexpected_at(index: usize, expected: &str, found: Token) -> DecodeError {
    DecodeError::UnexpectedToken {
        index,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Result of lenient decoding
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Salvaged {
    pub composition: Composition,
    /// Beats dropped as incomplete or malformed, including a trailing partial cycle
    pub skipped_beats: usize,
}

/// Lenient decode of raw model output
pub fn salvage<S: AsRef<str>>(tokens: &[S], n_beats: u32) -> Result<Salvaged, DecodeError> {
    if n_beats == 0 {
        return Err(DecodeError::InvalidConfig(
            "n_beats must be a positive integer".to_string(),
        ));
    }

    let tokens = trim_to_last_end_of_cycle(tokens);
    let (raw_beats, mut skipped_beats) = collect_beats(tokens);

    let mut beats: Vec<(u32, Vec<Sound>)> = Vec::with_capacity(raw_beats.len());
    for (number, raw) in raw_beats.iter().enumerate() {
        match parse_salvaged_beat(raw) {
            Some(beat) => beats.push(beat),
            None => {
                log::warn!("Skipping malformed beat #{}: {}", number + 1, raw.join(" "));
                skipped_beats += 1;
            }
        }
    }

    let mut composition = Composition::new();
    let per_cycle = n_beats as usize;
    let mut chunks = beats.chunks_exact(per_cycle);
    for cycle in chunks.by_ref() {
        let mut hits = Vec::new();
        for (beat_index, (subdivision, sounds)) in cycle.iter().enumerate() {
            let start = Beat::from_integer(beat_index as i64);
            for (position, sound) in sounds.iter().enumerate() {
                if !sound.is_silence() {
                    let offset = Beat::new(position as i64, i64::from(*subdivision));
                    hits.push(HitEvent::new(start + offset, *sound));
                }
            }
        }
        composition.append_cycle(hits);
    }
    skipped_beats += chunks.remainder().len();

    log::info!(
        "Salvaged {} cycles, skipped {} beats",
        composition.len(),
        skipped_beats
    );

    Ok(Salvaged {
        composition,
        skipped_beats,
    })
}

fn trim_to_last_end_of_cycle<S: AsRef<str>>(tokens: &[S]) -> &[S] {
    match tokens.iter().rposition(|t| t.as_ref() == END_OF_CYCLE) {
        Some(last) => &tokens[..=last],
        None => tokens,
    }
}

/// Complete `<SOB> .. <EOB>` spans with only SUBD/POS/HIT tokens kept, and
/// the number of beats that were opened but never closed
fn collect_beats<S: AsRef<str>>(tokens: &[S]) -> (Vec<Vec<&str>>, usize) {
    let mut beats = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    let mut unclosed = 0;

    for token in tokens {
        let token = token.as_ref();
        match token {
            START_OF_BEAT => {
                if current.is_some() {
                    unclosed += 1;
                }
                current = Some(Vec::new());
            }
            END_OF_BEAT => {
                if let Some(beat) = current.take() {
                    beats.push(beat);
                }
            }
            START_OF_CYCLE | END_OF_CYCLE => {
                if current.take().is_some() {
                    unclosed += 1;
                }
            }
            _ => {
                if let Some(beat) = current.as_mut() {
                    if token.starts_with(SUBDIVISION_PREFIX)
                        || token.starts_with(POSITION_PREFIX)
                        || token.starts_with(HIT_PREFIX)
                    {
                        beat.push(token);
                    }
                }
            }
        }
    }

    if current.is_some() {
        unclosed += 1;
    }

    (beats, unclosed)
}

/// `SUBD_n` followed by exactly `n` `POS_l HIT_x` pairs in order
fn parse_salvaged_beat(tokens: &[&str]) -> Option<(u32, Vec<Sound>)> {
    let (first, rest) = tokens.split_first()?;
    let subdivision = match first.parse::<Token>().ok()? {
        Token::Subdivision(n) if (1..=MODEL_MAX_SUBDIVISION).contains(&n) => n,
        _ => return None,
    };

    if rest.len() != 2 * subdivision as usize {
        return None;
    }

    let mut sounds = Vec::with_capacity(subdivision as usize);
    for (expected, pair) in rest.chunks_exact(2).enumerate() {
        match pair[0].parse::<Token>().ok()? {
            Token::Position(l) if l as usize == expected => {}
            _ => return None,
        }
        match strip_hit_suffix(pair[1]).parse::<Token>().ok()? {
            Token::Hit(sound) => sounds.push(sound),
            _ => return None,
        }
    }

    Some((subdivision, sounds))
}

/// `HIT_OTA_4` → `HIT_OTA`; older vocabularies suffixed hits with a count
fn strip_hit_suffix(token: &str) -> &str {
    let Some((base, suffix)) = token.rsplit_once('_') else {
        return token;
    };
    if !base.starts_with(HIT_PREFIX) || suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return token;
    }
    match suffix.parse::<u32>() {
        Ok(k) if (1..=MAX_HIT_SUFFIX).contains(&k) => base,
        _ => token,
    }
}
