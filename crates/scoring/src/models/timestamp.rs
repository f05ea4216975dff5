use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, ParseError, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A submission time normalized from either a structured value or an ISO-8601 string.
///
/// Timestamps without an offset are compared as if they were UTC, but keep
/// printing without an offset so that what goes in comes back out unchanged.
/// Ordering and equality only look at the instant.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    has_offset: bool,
}

impl Timestamp {
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn has_offset(&self) -> bool {
        self.has_offset
    }

    /// ISO-8601 rendering in `isoformat()` style: microsecond precision,
    /// fractional part only when non-zero.
    pub fn to_iso_string(&self) -> String {
        let format = match (self.instant.timestamp_subsec_micros() != 0, self.has_offset) {
            (true, true) => "%Y-%m-%dT%H:%M:%S%.6f%:z",
            (true, false) => "%Y-%m-%dT%H:%M:%S%.6f",
            (false, true) => "%Y-%m-%dT%H:%M:%S%:z",
            (false, false) => "%Y-%m-%dT%H:%M:%S",
        };

        if self.has_offset {
            self.instant.format(format).to_string()
        } else {
            self.instant.naive_local().format(format).to_string()
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant,
            has_offset: true,
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from(instant.fixed_offset())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Self {
            instant: naive.and_utc().fixed_offset(),
            has_offset: false,
        }
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let mut last_error = match DateTime::parse_from_rfc3339(s) {
            Ok(instant) => return Ok(Self::from(instant)),
            Err(e) => e,
        };

        for format in OFFSET_FORMATS {
            match DateTime::parse_from_str(s, format) {
                Ok(instant) => return Ok(Self::from(instant)),
                Err(e) => last_error = e,
            }
        }

        for format in NAIVE_FORMATS {
            match NaiveDateTime::parse_from_str(s, format) {
                Ok(naive) => return Ok(Self::from(naive)),
                Err(e) => last_error = e,
            }
        }

        match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Ok(Self::from(date.and_time(NaiveTime::MIN))),
            Err(_) => Err(last_error),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", value, e)))
    }
}
