use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar::ExerciseDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    MissingUsername,
    MissingExerciseFields,
    UserNotFound { user_id: String },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUsername => write!(f, "Username is required"),
            Self::MissingExerciseFields => write!(f, "Description and duration are required"),
            Self::UserNotFound { .. } => write!(f, "User not found"),
        }
    }
}

impl std::error::Error for DomainError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub owner_id: String,
    pub description: String,
    /// `None` when the submitted duration had no leading integer.
    pub duration_minutes: Option<i64>,
    pub date: ExerciseDate,
}

/// A body field exactly as submitted. JSON clients may send any JSON type and
/// form clients always send text; coercion to the stored type happens only
/// after the owner has been looked up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(pub Value);

impl FieldValue {
    pub fn text(raw: impl Into<String>) -> Self {
        Self(Value::String(raw.into()))
    }

    /// `null`, `false`, zero, NaN and the empty string count as "not provided".
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Strings as-is, numbers and booleans as written, anything else as JSON text.
    pub fn to_text(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => f.to_string(),
                _ => n.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Whole minutes: numbers are truncated, text goes through [`parse_leading_int`].
    pub fn minutes(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => match n.as_i64() {
                Some(n) => Some(n),
                None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
            },
            Value::String(s) => parse_leading_int(s),
            _ => None,
        }
    }

    /// Absent values fall back to `today`; numbers are Unix milliseconds.
    pub fn date(&self, today: NaiveDate) -> ExerciseDate {
        if !self.is_present() {
            return ExerciseDate::Day(today);
        }
        match &self.0 {
            Value::String(s) => ExerciseDate::parse(s),
            Value::Number(n) => n
                .as_f64()
                .map_or(ExerciseDate::Invalid, ExerciseDate::from_unix_millis),
            _ => ExerciseDate::Invalid,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewExercise {
    #[serde(default)]
    pub description: Option<FieldValue>,
    #[serde(default, rename = "durationMinutes", alias = "duration")]
    pub duration_minutes: Option<FieldValue>,
    #[serde(default)]
    pub date: Option<FieldValue>,
}

/// Reads an optional sign followed by decimal digits, ignoring leading
/// whitespace and anything after the digits. `"30min"` gives 30, `"abc"` gives `None`.
/// Values past the `i64` range saturate.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // The run is all ASCII digits, so parsing can only fail on overflow.
    let digits = &digits[..end];
    Some(if negative {
        format!("-{digits}").parse().unwrap_or(i64::MIN)
    } else {
        digits.parse().unwrap_or(i64::MAX)
    })
}
