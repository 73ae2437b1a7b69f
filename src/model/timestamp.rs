//! Lenient decoders for entry fields.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire format of entry timestamps, e.g. `2024-03-01T09:15:00+0100`.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// An entry timestamp.
///
/// Values that do not match [`WIRE_TIMESTAMP_FORMAT`] (or are not strings)
/// decode to the Unix epoch instead of failing the surrounding entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireTimestamp(pub DateTime<Utc>);

impl WireTimestamp {
    /// Parses the wire format, falling back to the epoch.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        DateTime::parse_from_str(raw.trim(), WIRE_TIMESTAMP_FORMAT)
            .map(|parsed| Self(parsed.with_timezone(&Utc)))
            .unwrap_or_default()
    }

    /// Returns true when the value is the epoch fallback.
    #[must_use]
    pub fn is_epoch(&self) -> bool {
        self.0 == DateTime::<Utc>::default()
    }
}

impl fmt::Display for WireTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_TIMESTAMP_FORMAT))
    }
}

impl<'de> Deserialize<'de> for WireTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .map(Self::parse_lenient)
            .unwrap_or_default())
    }
}

impl Serialize for WireTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decodes `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a 0/1 integer, a boolean, or `null` as a flag.
pub(crate) fn int_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Bool(flag) => flag,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        serde_json::Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

/// Encodes a flag as the 0/1 integer the server uses.
pub(crate) fn serialize_int_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_wire_timestamp_with_offset() {
        let ts = WireTimestamp::parse_lenient("2024-03-01T09:15:00+0100");
        assert_eq!(ts.0, Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_unparsable_timestamp_is_epoch() {
        assert!(WireTimestamp::parse_lenient("yesterday").is_epoch());
        assert!(WireTimestamp::parse_lenient("2024-03-01").is_epoch());
    }

    #[test]
    fn test_non_string_timestamp_is_epoch() {
        let ts: WireTimestamp = serde_json::from_str("12345").unwrap();
        assert!(ts.is_epoch());
        let ts: WireTimestamp = serde_json::from_str("null").unwrap();
        assert!(ts.is_epoch());
    }

    #[test]
    fn test_timestamp_serializes_in_wire_format() {
        let ts = WireTimestamp(Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap());
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2024-03-01T08:15:00+0000\""
        );
    }
}
