//! Token vocabulary and token streams
//!
//! The terminal alphabet consumed by the generative model:
//! `<SOC>`, `<EOC>`, `<SOB>`, `<EOB>`, `SUBD_<n>`, `POS_<l>`, `HIT_<symbol>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::Sound;

pub const START_OF_CYCLE: &str = "<SOC>";
pub const END_OF_CYCLE: &str = "<EOC>";
pub const START_OF_BEAT: &str = "<SOB>";
pub const END_OF_BEAT: &str = "<EOB>";
pub const SUBDIVISION_PREFIX: &str = "SUBD_";
pub const POSITION_PREFIX: &str = "POS_";
pub const HIT_PREFIX: &str = "HIT_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    StartOfCycle,
    EndOfCycle,
    StartOfBeat,
    EndOfBeat,
    /// Number of positions in the current beat
    Subdivision(u32),
    /// Position index within the current beat
    Position(u32),
    /// A sound fired at the current position; `Hit(Sound::Silence)` marks an empty one
    Hit(Sound),
}

/// Text that is not part of the token vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown token '{0}'")]
pub struct UnknownToken(pub String);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartOfCycle => f.write_str(START_OF_CYCLE),
            Token::EndOfCycle => f.write_str(END_OF_CYCLE),
            Token::StartOfBeat => f.write_str(START_OF_BEAT),
            Token::EndOfBeat => f.write_str(END_OF_BEAT),
            Token::Subdivision(n) => write!(f, "{}{}", SUBDIVISION_PREFIX, n),
            Token::Position(l) => write!(f, "{}{}", POSITION_PREFIX, l),
            Token::Hit(sound) => write!(f, "{}{}", HIT_PREFIX, sound.symbol()),
        }
    }
}

/// Plain decimal digits only; `u32::from_str` would also take a leading '+'
fn parse_count(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for Token {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownToken(s.to_string());

        match s {
            START_OF_CYCLE => return Ok(Token::StartOfCycle),
            END_OF_CYCLE => return Ok(Token::EndOfCycle),
            START_OF_BEAT => return Ok(Token::StartOfBeat),
            END_OF_BEAT => return Ok(Token::EndOfBeat),
            _ => {}
        }

        if let Some(n) = s.strip_prefix(SUBDIVISION_PREFIX) {
            return parse_count(n).map(Token::Subdivision).ok_or_else(unknown);
        }
        if let Some(l) = s.strip_prefix(POSITION_PREFIX) {
            return parse_count(l).map(Token::Position).ok_or_else(unknown);
        }
        if let Some(symbol) = s.strip_prefix(HIT_PREFIX) {
            return Sound::from_symbol(symbol).map(Token::Hit).ok_or_else(unknown);
        }

        Err(unknown())
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered token sequence: the entire payload handed to the inference transport
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TokenStream(Vec<Token>);

/// Request body expected by the inference transport
#[derive(Serialize)]
struct Payload<'a> {
    tokens: &'a TokenStream,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.0
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(Token::to_string).collect()
    }

    /// `{"tokens": [...]}`
    pub fn to_payload_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Payload { tokens: self })
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
