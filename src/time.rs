//! Timestamp parsing shared by inbound requests and forecast responses
//!
//! The forecasting API and its callers exchange ISO-8601 timestamps that may
//! or may not carry a UTC offset. Values are kept as [`Timestamp`]s: ordering
//! and equality follow the real instant, while hour-of-day tariff lookup and
//! calendar month grouping use the local time of the stated offset. Values
//! without an offset are taken as UTC, so their local time is exactly what
//! was written.

use crate::error::{MuffinError, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An instant together with the offset it was reported in
pub type Timestamp = DateTime<FixedOffset>;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const ISO_NAIVE: &str = "%Y-%m-%dT%H:%M:%S%.f";
const ISO_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

fn naive_as_utc(naive: NaiveDateTime) -> Timestamp {
    naive.and_utc().fixed_offset()
}

/// Parse into the instant and whether the text carried an offset
fn parse_parts(raw: &str) -> Result<(Timestamp, bool)> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok((dt, true));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok((dt, true));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok((naive_as_utc(dt), false));
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok((naive_as_utc(date.and_time(chrono::NaiveTime::MIN)), false));
    }
    Err(MuffinError::validation(
        "datetime",
        format!("unrecognised timestamp '{}'", raw),
    ))
}

/// Parse an ISO-8601 timestamp.
///
/// Offset-aware values (`Z`, `+02:00`) keep their offset; naive values are
/// read as UTC. A bare date maps to midnight.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    parse_parts(raw).map(|(at, _)| at)
}

/// A caller-supplied timestamp, re-emitted upstream in canonical ISO form.
///
/// Parsing happens once on deserialization so invalid values are rejected at
/// the request boundary. Serialization writes `YYYY-MM-DDTHH:MM:SS[.f]`,
/// followed by `±HH:MM` when the caller gave an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiDateTime {
    at: Timestamp,
    has_offset: bool,
}

impl ApiDateTime {
    pub fn parse(raw: &str) -> Result<Self> {
        let (at, has_offset) = parse_parts(raw)?;
        Ok(Self { at, has_offset })
    }

    /// The instant, for ordering and comparison
    pub fn instant(&self) -> Timestamp {
        self.at
    }

    pub fn to_iso(&self) -> String {
        if self.has_offset {
            self.at.format(ISO_OFFSET).to_string()
        } else {
            self.at.naive_local().format(ISO_NAIVE).to_string()
        }
    }
}

impl fmt::Display for ApiDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl Serialize for ApiDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for ApiDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ApiDateTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parses_naive_iso() {
        let dt = parse_timestamp("2023-01-01T16:00:00").unwrap();
        assert_eq!(
            dt.naive_local(),
            NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(16, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn offset_values_keep_their_local_hour() {
        let dt = parse_timestamp("2023-01-01T16:00:00-07:00").unwrap();
        assert_eq!(dt.hour(), 16);
        let dt = parse_timestamp("2023-01-01T23:00:00Z").unwrap();
        assert_eq!(dt.hour(), 23);
    }

    #[test]
    fn same_wall_clock_in_different_offsets_are_different_instants() {
        let first = parse_timestamp("2023-11-05T01:00:00-06:00").unwrap();
        let second = parse_timestamp("2023-11-05T01:00:00-07:00").unwrap();
        assert_ne!(first, second);
        assert!(first < second);
        assert_eq!(first.hour(), second.hour());
    }

    #[test]
    fn accepts_space_separator_and_bare_date() {
        assert_eq!(parse_timestamp("2023-03-05 07:30:00").unwrap().hour(), 7);
        assert_eq!(parse_timestamp("2023-03-05").unwrap().hour(), 0);
        assert_eq!(
            parse_timestamp("2023-03-05 07:30:00+01:00").unwrap().hour(),
            7
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, MuffinError::Validation { .. }));
    }

    #[test]
    fn api_datetime_serializes_canonical_iso() {
        let cases = [
            ("\" 2023-01-01 00:00\"", "\"2023-01-01T00:00:00\""),
            ("\"2023-02-01\"", "\"2023-02-01T00:00:00\""),
            ("\"2023-01-01T00:00:00Z\"", "\"2023-01-01T00:00:00+00:00\""),
            ("\"2023-01-01 06:30:00-08:00\"", "\"2023-01-01T06:30:00-08:00\""),
            ("\"2023-01-01T00:00:00.250\"", "\"2023-01-01T00:00:00.250\""),
        ];
        for (input, expected) in cases {
            let v: ApiDateTime = serde_json::from_str(input).unwrap();
            assert_eq!(serde_json::to_string(&v).unwrap(), expected, "{}", input);
        }
        assert!(serde_json::from_str::<ApiDateTime>("\"not a date\"").is_err());
    }

    #[test]
    fn canonical_form_parses_back_to_the_same_value() {
        for raw in ["2023-06-01 12:00", "2023-06-01T12:00:00+05:30"] {
            let v = ApiDateTime::parse(raw).unwrap();
            assert_eq!(ApiDateTime::parse(&v.to_iso()).unwrap(), v);
        }
    }
}
