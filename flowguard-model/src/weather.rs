//! Weather conditions attached to readings and prediction queries.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Fog,
    Snow,
    Storm,
}

impl Weather {
    /// Options offered by the forms.
    pub const ALL: [Weather; 5] = [Self::Clear, Self::Rain, Self::Fog, Self::Snow, Self::Storm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Rain => "Rain",
            Self::Fog => "Fog",
            Self::Snow => "Snow",
            Self::Storm => "Storm",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised conditions are treated as clear weather.
impl From<&str> for Weather {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "rain" => Self::Rain,
            "fog" => Self::Fog,
            "snow" => Self::Snow,
            "storm" => Self::Storm,
            _ => Self::Clear,
        }
    }
}

impl From<String> for Weather {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

/// A missing or null condition is clear weather.
impl From<Option<String>> for Weather {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_from_str() {
        assert_eq!(Weather::from("rain"), Weather::Rain);
        assert_eq!(Weather::from("FOG"), Weather::Fog);
        assert_eq!(Weather::from("hail"), Weather::Clear);
        assert_eq!(Weather::from(""), Weather::Clear);
    }

    #[test]
    fn test_weather_wire_format() {
        assert_eq!(serde_json::to_string(&Weather::Storm).unwrap(), "\"Storm\"");
        let parsed: Weather = serde_json::from_str("\"Drizzle\"").unwrap();
        assert_eq!(parsed, Weather::Clear);
    }

    #[test]
    fn test_null_weather_is_clear() {
        let parsed: Weather = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Weather::Clear);

        #[derive(Deserialize)]
        struct Row {
            weather: Weather,
        }
        let row: Row = serde_json::from_str(r#"{"weather": null}"#).unwrap();
        assert_eq!(row.weather, Weather::Clear);
        let row: Row = serde_json::from_str(r#"{"weather": "Snow"}"#).unwrap();
        assert_eq!(row.weather, Weather::Snow);
    }
}
