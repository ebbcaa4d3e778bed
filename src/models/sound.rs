//! Percussion sounds available to the authoring front-end
//!
//! The set is closed: every sound has a fixed token symbol used in `HIT_<symbol>`
//! tokens. The symbol table is a versioned contract with already-trained
//! consumers of the token stream, so symbols must never change without bumping
//! `SYMBOL_TABLE_VERSION`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TokenizerError;

/// Version of the sound → symbol table below
pub const SYMBOL_TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sound {
    Doom,
    OpenTak,
    OpenTik,
    Pa2,
    Silence,
}

impl Sound {
    /// All sounds, in palette order
    pub const ALL: [Sound; 5] = [
        Sound::Doom,
        Sound::OpenTak,
        Sound::OpenTik,
        Sound::Pa2,
        Sound::Silence,
    ];

    /// Symbol used in `HIT_<symbol>` tokens
    pub fn symbol(&self) -> &'static str {
        match self {
            Sound::Doom => "D",
            Sound::OpenTak => "OTA",
            Sound::OpenTik => "OTI",
            Sound::Pa2 => "PA2",
            Sound::Silence => "S",
        }
    }

    /// Look a sound up by its token symbol (exact, case-sensitive)
    pub fn from_symbol(symbol: &str) -> Option<Sound> {
        match symbol {
            "D" => Some(Sound::Doom),
            "OTA" => Some(Sound::OpenTak),
            "OTI" => Some(Sound::OpenTik),
            "PA2" => Some(Sound::Pa2),
            "S" => Some(Sound::Silence),
            _ => None,
        }
    }

    /// Human-readable name, as shown on the sound palette
    pub fn display_name(&self) -> &'static str {
        match self {
            Sound::Doom => "Doom",
            Sound::OpenTak => "Open Tak",
            Sound::OpenTik => "Open Tik",
            Sound::Pa2 => "Pa2",
            Sound::Silence => "Silence",
        }
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, Sound::Silence)
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Sound {
    type Err = TokenizerError;

    /// Accepts the display name ("Open Tak"), the compact name ("OpenTak"),
    /// or the token symbol ("OTA"). Names are matched case-insensitively,
    /// symbols exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(sound) = Sound::from_symbol(s) {
            return Ok(sound);
        }

        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match compact.as_str() {
            "doom" | "doum" => Ok(Sound::Doom),
            "opentak" => Ok(Sound::OpenTak),
            "opentik" => Ok(Sound::OpenTik),
            "pa2" => Ok(Sound::Pa2),
            "silence" => Ok(Sound::Silence),
            _ => Err(TokenizerError::UnknownSound(s.to_string())),
        }
    }
}

// Serialized as the display name so the front-end can use it directly
impl Serialize for Sound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.display_name())
    }
}

// Accepts any form FromStr understands
impl<'de> Deserialize<'de> for Sound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SoundVisitor;

        impl<'de> serde::de::Visitor<'de> for SoundVisitor {
            type Value = Sound;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sound name or token symbol")
            }

            fn visit_str<E>(self, value: &str) -> Result<Sound, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(SoundVisitor)
    }
}
