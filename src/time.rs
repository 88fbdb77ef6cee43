// ⏰ Time - nanoseconds since the Unix epoch
//
// Planting dates are entered with day granularity ("2026-03-01") but carried
// as integer nanoseconds so the wire format stays a plain number. Date-only
// input always lands on midnight UTC.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("date {0} is outside the representable nanosecond range")]
    OutOfRange(NaiveDate),
}

// ============================================================================
// TIME VALUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

impl Time {
    pub const fn from_nanos(nanos: i64) -> Self {
        Time(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Midnight UTC of `date`
    pub fn from_date(date: NaiveDate) -> Result<Self, TimeError> {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or(TimeError::OutOfRange(date))?;
        Utc.from_utc_datetime(&midnight)
            .timestamp_nanos_opt()
            .map(Time)
            .ok_or(TimeError::OutOfRange(date))
    }

    /// Parse a date-only `YYYY-MM-DD` string (surrounding whitespace ignored)
    pub fn parse_date(input: &str) -> Result<Self, TimeError> {
        let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
            TimeError::InvalidDate {
                input: input.to_string(),
            }
        })?;
        Time::from_date(date)
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.0)
    }

    pub fn to_date(self) -> NaiveDate {
        self.to_datetime().date_naive()
    }

    /// `YYYY-MM-DD` in UTC
    pub fn to_date_string(self) -> String {
        self.to_date().format(DATE_FORMAT).to_string()
    }

    /// Human form used in listings, e.g. `October 16, 2026`
    pub fn format_long(self) -> String {
        self.to_date().format("%B %-d, %Y").to_string()
    }

    /// Shift by whole days, saturating at the ends of the range
    pub fn plus_days(self, days: i64) -> Self {
        Time(self.0.saturating_add(days.saturating_mul(NANOS_PER_DAY)))
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_date_string())
    }
}

impl From<DateTime<Utc>> for Time {
    /// Saturates for instants outside the nanosecond range (before 1677 or after 2262)
    fn from(dt: DateTime<Utc>) -> Self {
        let nanos = dt.timestamp_nanos_opt().unwrap_or(if dt.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        });
        Time(nanos)
    }
}

/// Whole days elapsed from `start` to `end`, floored (5.9 days -> 5, -0.5 days -> -1)
pub fn days_between(start: Time, end: Time) -> i64 {
    let diff = i128::from(end.0) - i128::from(start.0);
    diff.div_euclid(i128::from(NANOS_PER_DAY)) as i64
}

// ============================================================================
// SERDE
// ============================================================================

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeRepr {
    Nanos(i64),
    Date(String),
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TimeRepr::deserialize(deserializer)? {
            TimeRepr::Nanos(nanos) => Ok(Time(nanos)),
            TimeRepr::Date(s) => Time::parse_date(&s).map_err(serde::de::Error::custom),
        }
    }
}
