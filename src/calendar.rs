use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%a %b %d %Y";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    DISPLAY_FORMAT,
    "%b %d %Y",
    "%B %d, %Y",
];

// Naive timestamps are read as UTC.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Calendar day attached to an exercise, or a marker for input that did not
/// parse. Invalid dates are kept, not rejected, and never satisfy a range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseDate {
    Day(NaiveDate),
    Invalid,
}

impl ExerciseDate {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some(day) = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        {
            return Self::Day(day);
        }
        if let Some(ts) = DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        {
            return Self::Day(ts.date());
        }
        if let Ok(ts) =
            DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw))
        {
            return Self::Day(ts.with_timezone(&Utc).date_naive());
        }

        Self::Invalid
    }

    /// Day of a millisecond Unix timestamp, taken in UTC.
    pub fn from_unix_millis(millis: f64) -> Self {
        if !millis.is_finite() {
            return Self::Invalid;
        }
        match DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64) {
            Some(ts) => Self::Day(ts.date_naive()),
            None => Self::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Day(_))
    }

    pub fn on_or_after(&self, bound: &Self) -> bool {
        match (self, bound) {
            (Self::Day(day), Self::Day(bound)) => day >= bound,
            _ => false,
        }
    }

    pub fn on_or_before(&self, bound: &Self) -> bool {
        match (self, bound) {
            (Self::Day(day), Self::Day(bound)) => day <= bound,
            _ => false,
        }
    }
}

impl fmt::Display for ExerciseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(day) => write!(f, "{}", day.format(DISPLAY_FORMAT)),
            Self::Invalid => f.write_str(INVALID_DATE),
        }
    }
}

impl Serialize for ExerciseDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
