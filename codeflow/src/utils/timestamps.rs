//! Timestamp utilities for flow records and publish results.
//!
//! The admin backend and the production target do not agree on one wire
//! format: records arrive as RFC 3339 strings, as `YYYY-MM-DD HH:MM:SS`
//! strings, or as Unix milliseconds. Everything is normalized to UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Errors that can occur during timestamp parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    /// The timestamp string is empty.
    #[error("Empty timestamp string")]
    EmptyString,

    /// The timestamp value is invalid.
    #[error("Invalid timestamp: {0}")]
    InvalidFormat(String),
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp the way the JSON APIs emit them:
/// `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// # Examples
///
/// ```
/// use codeflow::utils::{format_timestamp, parse_timestamp};
///
/// let ts = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
/// assert_eq!(format_timestamp(&ts), "2024-01-01T00:00:00.000Z");
/// ```
#[must_use]
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a timestamp from RFC 3339, a naive `YYYY-MM-DD HH:MM:SS` string
/// (read as UTC), or integer Unix milliseconds.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimestampError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(TimestampError::EmptyString);
    }

    if let Ok(millis) = trimmed.parse::<i64>() {
        return parse_unix_millis(millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(TimestampError::InvalidFormat(trimmed.to_string()))
}

/// Converts Unix milliseconds to a timestamp.
pub fn parse_unix_millis(millis: i64) -> Result<Timestamp, TimestampError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| TimestampError::InvalidFormat(millis.to_string()))
}

/// Serde adapter accepting every format [`parse_timestamp`] understands.
pub mod flexible {
    use super::{format_timestamp, parse_timestamp, parse_unix_millis, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    fn from_raw<E: serde::de::Error>(raw: Raw) -> Result<Timestamp, E> {
        match raw {
            Raw::Text(s) => parse_timestamp(&s).map_err(E::custom),
            Raw::Millis(ms) => parse_unix_millis(ms).map_err(E::custom),
        }
    }

    /// Serializes as `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    /// Deserializes from a string or integer milliseconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = Raw::deserialize(deserializer)?;
        from_raw(raw)
    }

    /// The same adapter for optional fields; `null` and `""` read as `None`.
    pub mod option {
        use super::{format_timestamp, from_raw, Raw, Timestamp};
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serializes `None` as `null`.
        pub fn serialize<S: Serializer>(
            ts: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
                None => serializer.serialize_none(),
            }
        }

        /// Deserializes an optional timestamp.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            match Option::<Raw>::deserialize(deserializer)? {
                None => Ok(None),
                Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
                Some(raw) => from_raw(raw).map(Some),
            }
        }
    }
}
