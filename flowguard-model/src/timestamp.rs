//! Timestamp parsing and the wire format.
//!
//! Readings are emitted as `YYYY-MM-DDTHH:MM:SS` (naive local time). On
//! input we also accept the space-separated SQL form, RFC 3339, and the
//! RFC 2822 form that Flask's `jsonify` produces for datetimes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse any timestamp shape a backend may send.
pub fn parse(input: &str) -> Option<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Some(t.naive_utc());
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a calendar date, accepting full timestamps too.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse(input).map(|t| t.date()))
}

pub fn format(t: &NaiveDateTime) -> String {
    t.format(WIRE_FORMAT).to_string()
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// `#[serde(with = "timestamp::wire")]` for `NaiveDateTime` fields.
pub mod wire {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// `#[serde(with = "timestamp::wire_opt")]` for optional timestamps.
pub mod wire_opt {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&super::format(t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
        }
    }
}

/// `#[serde(with = "timestamp::date")]` for `NaiveDate` fields.
pub mod date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_sql_and_iso_forms() {
        let sql = parse("2024-01-15 09:00:00").unwrap();
        let iso = parse("2024-01-15T09:00:00").unwrap();
        assert_eq!(sql, iso);
        assert_eq!(sql.hour(), 9);

        let zulu = parse("2024-01-15T09:00:00.000Z").unwrap();
        assert_eq!(zulu, sql);
    }

    #[test]
    fn test_parse_flask_http_date() {
        let t = parse("Mon, 15 Jan 2024 09:00:00 GMT").unwrap();
        assert_eq!(format(&t), "2024-01-15T09:00:00");
    }

    #[test]
    fn test_parse_date_only() {
        let t = parse("2024-03-01").unwrap();
        assert_eq!(format(&t), "2024-03-01T00:00:00");
        assert_eq!(
            parse_date("Fri, 01 Mar 2024 00:00:00 GMT"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert!(parse("").is_none());
        assert!(parse("yesterday").is_none());
    }
}
