//! Lenient field deserializers.
//!
//! Backends built on SQL drivers are loose with types: averages arrive as
//! decimal strings, booleans as `0`/`1`, optional text columns as `null`.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// `null` becomes `T::default()`.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_to_f64<E: de::Error>(value: &Value) -> Result<Option<f64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
        other => Err(E::custom(format!("expected a number, got {}", other))),
    }
}

/// Number or numeric string; `null` is zero.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64::<D::Error>(&value)?.unwrap_or(0.0))
}

/// Number or numeric string, keeping `null` as `None`.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_f64::<D::Error>(&value)
}

fn value_to_bool<E: de::Error>(value: &Value) -> Result<Option<bool>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(Some(n.as_f64().unwrap_or(0.0) != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" | "0" | "false" | "no" => Ok(Some(false)),
            "1" | "true" | "yes" => Ok(Some(true)),
            _ => Err(E::custom(format!("expected a boolean, got {:?}", s))),
        },
        other => Err(E::custom(format!("expected a boolean, got {}", other))),
    }
}

/// Bool, `0`/`1`, or `"true"`/`"false"`; `null` is false.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_bool::<D::Error>(&value)?.unwrap_or(false))
}

pub fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_bool::<D::Error>(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "lenient_f64")]
        avg: f64,
        #[serde(deserialize_with = "lenient_bool")]
        flag: bool,
        #[serde(default, deserialize_with = "null_default")]
        area: String,
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        max: Option<f64>,
    }

    #[test]
    fn test_decimal_strings_and_int_bools() {
        let s: Sample =
            serde_json::from_str(r#"{"avg": "920.0", "flag": 1, "area": null, "max": null}"#)
                .unwrap();
        assert_eq!(s.avg, 920.0);
        assert!(s.flag);
        assert_eq!(s.area, "");
        assert_eq!(s.max, None);
    }

    #[test]
    fn test_plain_values() {
        let s: Sample =
            serde_json::from_str(r#"{"avg": 12.5, "flag": false, "area": "CBD", "max": 7}"#)
                .unwrap();
        assert_eq!(s.avg, 12.5);
        assert!(!s.flag);
        assert_eq!(s.area, "CBD");
        assert_eq!(s.max, Some(7.0));
    }

    #[test]
    fn test_missing_optional_fields() {
        let s: Sample = serde_json::from_str(r#"{"avg": 1, "flag": "true"}"#).unwrap();
        assert!(s.flag);
        assert_eq!(s.max, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"avg": "lots", "flag": 0}"#).is_err());
    }
}
