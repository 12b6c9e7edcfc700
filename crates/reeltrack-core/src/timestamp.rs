//! Millisecond-precision UTC timestamps.
//!
//! Every timestamp the tracker captures is truncated to whole milliseconds so
//! that the persisted ISO-8601 form (`2024-05-01T12:00:00.123Z`) round-trips to
//! an identical value. Use as `#[serde(with = "crate::timestamp")]`.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current UTC time truncated to millisecond precision.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render a timestamp in the persisted ISO-8601 form.
#[must_use]
pub fn to_iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize a timestamp as an ISO-8601 string with exactly three fractional digits.
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso8601(ts))
}

/// Deserialize an RFC 3339 / ISO-8601 string into a UTC timestamp.
///
/// # Errors
///
/// Returns a deserializer error if the string is not a valid RFC 3339 date.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}
