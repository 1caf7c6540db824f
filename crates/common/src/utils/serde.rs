//! Serde adapters for `Duration` configuration fields.
//!
//! Durations are carried as integer milliseconds on the wire, which keeps
//! config files free of unit suffixes and round-trips losslessly through
//! JSON and TOML.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize a `Duration` as integer milliseconds.
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use mailgate_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     base: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    /// Serialize a `Duration` as milliseconds (u64).
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    /// Deserialize milliseconds (u64) into a `Duration`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Serialize/deserialize an `Option<Duration>` as optional integer
/// milliseconds; a missing field stays `None`.
pub mod opt_duration_millis {
    use super::*;

    /// Serialize an optional `Duration` as milliseconds.
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize optional milliseconds into an `Option<Duration>`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the duration serde adapters.

    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "duration_millis")]
        base: Duration,
        #[serde(with = "opt_duration_millis", default)]
        floor: Option<Duration>,
    }

    /// Validates `duration_millis` behavior for the round-trip scenario.
    ///
    /// Assertions:
    /// - Confirms a struct survives a JSON round-trip unchanged.
    /// - Confirms the wire representation is integer milliseconds.
    #[test]
    fn test_round_trip_through_json() {
        let sample = Sample { base: Duration::from_millis(1500), floor: None };

        let json = serde_json::to_string(&sample).expect("serialize");
        assert!(json.contains("1500"));

        let back: Sample = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, sample);
    }

    /// Validates `opt_duration_millis` behavior for the present-and-missing
    /// scenarios.
    ///
    /// Assertions:
    /// - Confirms a missing field deserializes to `None`.
    /// - Confirms a present field deserializes to `Some`.
    #[test]
    fn test_optional_field() {
        let back: Sample = serde_json::from_str(r#"{"base": 100}"#).expect("deserialize");
        assert_eq!(back.floor, None);

        let back: Sample =
            serde_json::from_str(r#"{"base": 100, "floor": 250}"#).expect("deserialize");
        assert_eq!(back.floor, Some(Duration::from_millis(250)));
    }
}
