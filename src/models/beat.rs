//! Exact beat arithmetic
//!
//! Beat positions are stored as reduced fractions so the emitter can test
//! positions for exact equality. Floating point only appears at the edges
//! (pointer input, rendering) and is converted here.

use num_rational::Rational64;

/// A position or duration on the cycle's beat axis, in beats
pub type Beat = Rational64;

/// Largest number of decimal places accepted by `parse_fraction`
const MAX_DECIMAL_PLACES: usize = 18;

/// Parse a beat or snap value written as a fraction ("3/2"), an integer ("2"),
/// or a decimal ("0.25", "-1.5"). Decimals are converted exactly.
pub fn parse_fraction(text: &str) -> Result<Beat, String> {
    let text = text.trim();

    if let Some((numer, denom)) = text.split_once('/') {
        let numer: i64 = numer
            .trim()
            .parse()
            .map_err(|_| format!("Invalid fraction numerator in '{}'", text))?;
        let denom: i64 = denom
            .trim()
            .parse()
            .map_err(|_| format!("Invalid fraction denominator in '{}'", text))?;
        if denom == 0 {
            return Err(format!("Zero denominator in '{}'", text));
        }
        return Ok(Beat::new(numer, denom));
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(format!("Invalid number '{}'", text));
    }
    if frac_part.len() > MAX_DECIMAL_PLACES {
        return Err(format!("Too many decimal places in '{}'", text));
    }

    let overflow = || format!("Number '{}' is out of range", text);
    let scale = 10i64.pow(frac_part.len() as u32);
    let int_value: i64 = if int_part.is_empty() { 0 } else { int_part.parse().map_err(|_| overflow())? };
    let frac_value: i64 = if frac_part.is_empty() { 0 } else { frac_part.parse().map_err(|_| overflow())? };

    let numer = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)?;

    Ok(Beat::new(if negative { -numer } else { numer }, scale))
}

/// Integer beat index containing `beat` (floor)
pub fn beat_index(beat: &Beat) -> i64 {
    beat.floor().to_integer()
}

/// Position of `beat` within its own beat, in `[0, 1)`
pub fn offset_in_beat(beat: &Beat) -> Beat {
    beat - beat.floor()
}

/// Whether `beat` lies in the half-open cycle `[0, n_beats)`
pub fn is_within_cycle(beat: &Beat, n_beats: u32) -> bool {
    *beat >= Beat::from_integer(0) && *beat < Beat::from_integer(i64::from(n_beats))
}

/// Lossy conversion for renderers and logging
pub fn beat_to_f64(beat: &Beat) -> f64 {
    *beat.numer() as f64 / *beat.denom() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction_forms() {
        assert_eq!(parse_fraction("1/4").unwrap(), Beat::new(1, 4));
        assert_eq!(parse_fraction(" 6 / 8 ").unwrap(), Beat::new(3, 4));
        assert_eq!(parse_fraction("2").unwrap(), Beat::from_integer(2));
        assert_eq!(parse_fraction("0.25").unwrap(), Beat::new(1, 4));
        assert_eq!(parse_fraction(".5").unwrap(), Beat::new(1, 2));
        assert_eq!(parse_fraction("1.5").unwrap(), Beat::new(3, 2));
        assert_eq!(parse_fraction("-0.125").unwrap(), Beat::new(-1, 8));
    }

    #[test]
    fn test_parse_fraction_is_exact() {
        // 0.1 has no exact binary representation; the fraction must still be 1/10
        assert_eq!(parse_fraction("0.1").unwrap(), Beat::new(1, 10));
        assert_eq!(parse_fraction("0.3").unwrap(), Beat::new(3, 10));
    }

    #[test]
    fn test_parse_fraction_rejects_garbage() {
        assert!(parse_fraction("").is_err());
        assert!(parse_fraction(".").is_err());
        assert!(parse_fraction("1/0").is_err());
        assert!(parse_fraction("abc").is_err());
        assert!(parse_fraction("1.2.3").is_err());
        assert!(parse_fraction("NaN").is_err());
        assert!(parse_fraction("0.1234567890123456789").is_err());
    }

    #[test]
    fn test_beat_index_and_offset() {
        let beat = Beat::new(7, 4);
        assert_eq!(beat_index(&beat), 1);
        assert_eq!(offset_in_beat(&beat), Beat::new(3, 4));

        let whole = Beat::from_integer(3);
        assert_eq!(beat_index(&whole), 3);
        assert_eq!(offset_in_beat(&whole), Beat::from_integer(0));
    }

    #[test]
    fn test_cycle_bounds_are_half_open() {
        assert!(is_within_cycle(&Beat::from_integer(0), 4));
        assert!(is_within_cycle(&Beat::new(15, 4), 4));
        assert!(!is_within_cycle(&Beat::from_integer(4), 4));
        assert!(!is_within_cycle(&Beat::new(-1, 4), 4));
    }
}
