//! Field kinds and form-value coercion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use std::fmt;

/// How a raw form value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored as entered.
    Text,
    /// Integer when integral, float otherwise.
    Number,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Instant, stored as RFC 3339 UTC.
    Timestamp,
}

impl FieldKind {
    /// Converts a non-empty raw value into its stored form.
    ///
    /// Timestamps accept RFC 3339 or a local `YYYY-MM-DDTHH:MM[:SS]`
    /// value, read as UTC.
    ///
    /// # Errors
    ///
    /// Returns a short reason when the text does not parse.
    pub fn coerce(self, raw: &str) -> Result<Value, &'static str> {
        let raw = raw.trim();
        match self {
            Self::Text => Ok(Value::String(raw.to_string())),
            Self::Number => parse_number(raw).ok_or("expected a number"),
            Self::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| "expected a date (YYYY-MM-DD)"),
            Self::Timestamp => parse_timestamp(raw)
                .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::Secs, true)))
                .ok_or("expected a timestamp (RFC 3339 or YYYY-MM-DDTHH:MM)"),
        }
    }

    /// Stored value for an empty optional field.
    #[must_use]
    pub fn empty(self) -> Value {
        match self {
            Self::Text => Value::String(String::new()),
            Self::Number | Self::Date | Self::Timestamp => Value::Null,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
        };
        f.write_str(s)
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    let f = raw.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        // "42.0" is stored as 42
        return Some(Value::Number((f as i64).into()));
    }
    Number::from_f64(f).map(Value::Number)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers() {
        assert_eq!(FieldKind::Number.coerce("1042").unwrap(), json!(1042));
        assert_eq!(FieldKind::Number.coerce(" 42.0 ").unwrap(), json!(42));
        assert_eq!(FieldKind::Number.coerce("-6.2").unwrap(), json!(-6.2));
        assert!(FieldKind::Number.coerce("twelve").is_err());
        assert!(FieldKind::Number.coerce("NaN").is_err());
    }

    #[test]
    fn dates() {
        assert_eq!(
            FieldKind::Date.coerce("2024-02-29").unwrap(),
            json!("2024-02-29")
        );
        assert!(FieldKind::Date.coerce("2023-02-29").is_err());
        assert!(FieldKind::Date.coerce("29/02/2024").is_err());
    }

    #[test]
    fn timestamps_normalize_to_utc() {
        assert_eq!(
            FieldKind::Timestamp.coerce("2024-05-01T08:30").unwrap(),
            json!("2024-05-01T08:30:00Z")
        );
        assert_eq!(
            FieldKind::Timestamp
                .coerce("2024-05-01T15:30:00+07:00")
                .unwrap(),
            json!("2024-05-01T08:30:00Z")
        );
        assert!(FieldKind::Timestamp.coerce("yesterday").is_err());
    }

    #[test]
    fn text_is_trimmed_verbatim() {
        assert_eq!(FieldKind::Text.coerce("  Gerbang A ").unwrap(), json!("Gerbang A"));
    }

    #[test]
    fn empty_values() {
        assert_eq!(FieldKind::Text.empty(), json!(""));
        assert_eq!(FieldKind::Number.empty(), Value::Null);
    }
}
