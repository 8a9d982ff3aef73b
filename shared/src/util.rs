//! Serde helpers for the backend's loosely typed fields
//!
//! The reservation backend is not strict about JSON types: table numbers come
//! back as strings or numbers, counters sometimes arrive quoted, and datetimes
//! use either a `T` or a space separator. These helpers accept every variant
//! seen on the wire and always serialize one canonical form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};
use std::str::FromStr;

/// Canonical datetime format sent to the backend (`2025-07-27T13:00:00`)
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Canonical time-of-day format sent to the backend (`13:00:00`)
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Canonical date format sent to the backend (`2025-07-27`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Parse a datetime in any of the formats the backend emits.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    [
        DATETIME_FORMAT,
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    .or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.naive_local())
    })
}

/// Parse a time of day with or without seconds.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Parse a calendar date, ignoring any trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// String fields that the backend may send as numbers (`numero_mesa: 7`).
pub mod string_or_number {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
        })
    }

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value)
    }
}

/// Optional variant of [`string_or_number`]; `null` maps to `None`.
pub mod opt_string_or_number {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(
            Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
                Scalar::Int(n) => n.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Text(s) => s,
            }),
        )
    }
}

/// Integer fields that may arrive quoted (`"capacidad": "4"`).
pub mod lenient_int {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64> + FromStr,
    {
        match Scalar::deserialize(deserializer)? {
            Scalar::Int(n) => T::try_from(n)
                .map_err(|_| de::Error::custom(format!("integer out of range: {n}"))),
            Scalar::Float(f) if f.fract() == 0.0 => T::try_from(f as i64)
                .map_err(|_| de::Error::custom(format!("integer out of range: {f}"))),
            Scalar::Float(f) => Err(de::Error::custom(format!("expected integer, got {f}"))),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid integer: {s}"))),
        }
    }
}

/// Optional variant of [`lenient_int`]; `null` maps to `None`.
pub mod opt_lenient_int {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64> + FromStr,
    {
        #[derive(Deserialize)]
        struct Wrap<T: TryFrom<i64> + FromStr>(
            #[serde(deserialize_with = "super::lenient_int::deserialize")] T,
        );

        Ok(Option::<Wrap<T>>::deserialize(deserializer)?.map(|Wrap(value)| value))
    }
}

/// `NaiveDateTime` with the backend's accepted input formats.
pub mod datetime {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(DATETIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).ok_or_else(|| de::Error::custom(format!("invalid datetime: {raw}")))
    }
}

/// `NaiveTime` serialized as `HH:MM:SS`, accepting `HH:MM` on input.
pub mod time_of_day {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time(&raw).ok_or_else(|| de::Error::custom(format!("invalid time: {raw}")))
    }
}

/// `NaiveDate` serialized as `YYYY-MM-DD`, tolerating a trailing time part.
pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_datetime_separators() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 27)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-07-27T13:00:00"), Some(expected));
        assert_eq!(parse_datetime("2025-07-27 13:00:00"), Some(expected));
        assert_eq!(parse_datetime("2025-07-27T13:00"), Some(expected));
        assert_eq!(parse_datetime("27/07/2025"), None);
    }

    #[test]
    fn parses_short_times_and_dates_with_suffix() {
        assert_eq!(parse_time("13:30"), NaiveTime::from_hms_opt(13, 30, 0));
        assert_eq!(parse_time("13:30:15"), NaiveTime::from_hms_opt(13, 30, 15));
        assert_eq!(
            parse_date("2025-07-27T00:00:00.000000Z"),
            NaiveDate::from_ymd_opt(2025, 7, 27)
        );
    }

    #[test]
    fn lenient_fields_accept_quoted_numbers() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "lenient_int::deserialize")]
            capacity: u32,
            #[serde(deserialize_with = "string_or_number::deserialize")]
            label: String,
            #[serde(default, deserialize_with = "opt_lenient_int::deserialize")]
            owner: Option<i64>,
        }

        let row: Row =
            serde_json::from_str(r#"{"capacity":"4","label":12,"owner":null}"#).unwrap();
        assert_eq!(row.capacity, 4);
        assert_eq!(row.label, "12");
        assert_eq!(row.owner, None);

        let row: Row = serde_json::from_str(r#"{"capacity":6,"label":"A1","owner":"3"}"#).unwrap();
        assert_eq!(row.capacity, 6);
        assert_eq!(row.owner, Some(3));
    }

    #[test]
    fn optional_labels_accept_numbers_text_and_null() {
        #[derive(Deserialize)]
        struct Label {
            #[serde(default, deserialize_with = "opt_string_or_number::deserialize")]
            number: Option<String>,
        }

        let parse = |raw: &str| serde_json::from_str::<Label>(raw).unwrap().number;
        assert_eq!(parse(r#"{"number":7}"#).as_deref(), Some("7"));
        assert_eq!(parse(r#"{"number":"B2"}"#).as_deref(), Some("B2"));
        assert_eq!(parse(r#"{"number":null}"#), None);
        assert_eq!(parse("{}"), None);
    }
}
