//! Serde serialization helpers for exact fractions
//!
//! Fractions are written as strings ("3/2") so no precision is lost in JSON or
//! YAML, and read back from strings, integers or floats. Floats go through
//! their shortest decimal form, so a JS `0.1` becomes exactly 1/10.

use serde::{Deserializer, Serializer};
use std::fmt;

use crate::models::beat::{parse_fraction, Beat};

/// `#[serde(with = "fraction")]` for `Beat` fields
pub mod fraction {
    use super::*;

    pub fn serialize<S>(value: &Beat, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Beat, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FractionVisitor)
    }
}

struct FractionVisitor;

impl<'de> serde::de::Visitor<'de> for FractionVisitor {
    type Value = Beat;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a fraction string like \"3/2\" or a number")
    }

    fn visit_str<E>(self, value: &str) -> Result<Beat, E>
    where
        E: serde::de::Error,
    {
        parse_fraction(value).map_err(E::custom)
    }

    fn visit_i64<E>(self, value: i64) -> Result<Beat, E>
    where
        E: serde::de::Error,
    {
        Ok(Beat::from_integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Beat, E>
    where
        E: serde::de::Error,
    {
        i64::try_from(value)
            .map(Beat::from_integer)
            .map_err(|_| E::custom(format!("beat value {} is out of range", value)))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Beat, E>
    where
        E: serde::de::Error,
    {
        if !value.is_finite() {
            return Err(E::custom(format!("beat value {} is not finite", value)));
        }
        parse_fraction(&value.to_string()).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Holder {
        #[serde(with = "fraction")]
        value: Beat,
    }

    #[test]
    fn test_serializes_as_fraction_string() {
        let json = serde_json::to_string(&Holder { value: Beat::new(3, 2) }).unwrap();
        assert_eq!(json, r#"{"value":"3/2"}"#);

        let json = serde_json::to_string(&Holder { value: Beat::from_integer(2) }).unwrap();
        assert_eq!(json, r#"{"value":"2"}"#);
    }

    #[test]
    fn test_deserializes_numbers_exactly() {
        let holder: Holder = serde_json::from_str(r#"{"value":0.1}"#).unwrap();
        assert_eq!(holder.value, Beat::new(1, 10));

        let holder: Holder = serde_json::from_str(r#"{"value":3}"#).unwrap();
        assert_eq!(holder.value, Beat::from_integer(3));

        let holder: Holder = serde_json::from_str(r#"{"value":"5/8"}"#).unwrap();
        assert_eq!(holder.value, Beat::new(5, 8));
    }

    #[test]
    fn test_rejects_bad_strings() {
        assert!(serde_json::from_str::<Holder>(r#"{"value":"1/0"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"value":"soon"}"#).is_err());
    }
}
