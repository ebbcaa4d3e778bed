//! Per-beat subdivision resolution
//!
//! Decides how many equally spaced positions a beat is written with, from the
//! offsets of the hits that fall inside it.
//!
//! Two policies are available:
//!
//! - **Legacy** follows the rule the deployed inference service was trained
//!   on: empty beat → 4; one hit → `1 / offset` (4 when the offset is 0); two or
//!   more hits → `1 / smallest gap` (4 when the gap is 0). Only the smallest gap
//!   is considered, so hits that are not multiples of it fall between positions
//!   and are written as silence. Where `1 / gap` is an integer the output is
//!   token-identical to the service. Where it is not, the service wrote a
//!   fractional `SUBD_1.333…` with `ceil` positions, which the model side
//!   cannot parse; here it is truncated to an integer instead. Counts above
//!   `MODEL_MAX_SUBDIVISION` are rejected.
//! - **Grid** picks the smallest power of two (up to the configured ceiling)
//!   that puts every hit exactly on a position, so decoding recovers every hit.

use num_traits::CheckedSub;
use serde::{Deserialize, Serialize};

use crate::models::Beat;

/// Subdivision used for empty beats and beats whose hits all sit on the downbeat
pub const DEFAULT_SUBDIVISION: u32 = 4;

/// Largest `SUBD_n` the model side accepts
pub const MODEL_MAX_SUBDIVISION: u32 = 64;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubdivisionPolicy {
    #[default]
    Legacy,
    Grid,
}

/// Why a beat has no usable subdivision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unresolved {
    /// Grid: no power of two up to the ceiling places every hit
    OffGrid,
    /// Legacy: `1 / gap` asks for more positions than the model accepts
    TooFine { required: i64 },
    /// The gap between two hits cannot be computed in 64-bit fractions
    Overflow { beat: Beat },
}

impl SubdivisionPolicy {
    /// Resolve the subdivision for one beat.
    ///
    /// `offsets` are hit positions relative to the start of the beat, each in
    /// `[0, 1)`, sorted ascending.
    pub fn resolve(&self, offsets: &[Beat], max_subdivision: u32) -> Result<u32, Unresolved> {
        match self {
            SubdivisionPolicy::Legacy => resolve_legacy(offsets),
            SubdivisionPolicy::Grid => resolve_grid(offsets, max_subdivision),
        }
    }
}

fn resolve_legacy(offsets: &[Beat]) -> Result<u32, Unresolved> {
    let zero = Beat::from_integer(0);

    let gap = match offsets {
        [] => return Ok(DEFAULT_SUBDIVISION),
        [only] => *only,
        _ => {
            let mut smallest: Option<Beat> = None;
            for pair in offsets.windows(2) {
                let gap = pair[1]
                    .checked_sub(&pair[0])
                    .ok_or(Unresolved::Overflow { beat: pair[1] })?;
                smallest = Some(smallest.map_or(gap, |s| s.min(gap)));
            }
            smallest.unwrap_or(zero)
        }
    };

    if gap == zero {
        return Ok(DEFAULT_SUBDIVISION);
    }

    let exact = gap.recip();
    let required = exact.to_integer().max(1);
    if required > i64::from(MODEL_MAX_SUBDIVISION) {
        return Err(Unresolved::TooFine { required });
    }
    if !exact.is_integer() {
        log::warn!(
            "Subdivision 1/{} = {} is not integral; truncating to {}",
            gap,
            exact,
            required
        );
    }

    u32::try_from(required).map_err(|_| Unresolved::TooFine { required })
}

fn resolve_grid(offsets: &[Beat], max_subdivision: u32) -> Result<u32, Unresolved> {
    let zero = Beat::from_integer(0);

    if offsets.iter().all(|offset| *offset == zero) {
        return Ok(DEFAULT_SUBDIVISION);
    }

    // Offsets are reduced, so `offset * p` is whole exactly when the
    // denominator divides `p`
    let mut positions: u32 = 1;
    while positions <= max_subdivision {
        let scale = i64::from(positions);
        if offsets.iter().all(|offset| scale % offset.denom() == 0) {
            return Ok(positions);
        }
        positions = positions.checked_mul(2).ok_or(Unresolved::OffGrid)?;
    }

    Err(Unresolved::OffGrid)
}
