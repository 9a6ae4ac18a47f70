//! Congestion predictions and the offline demo heuristics.

use serde::{Deserialize, Serialize};

use crate::de::{lenient_bool, lenient_f64, null_default};
use crate::level::CongestionLevel;
use crate::weather::Weather;

/// Inputs of `GET /predict/{road_id}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictionQuery {
    pub hour: u32,
    pub weather: Weather,
    pub is_holiday: bool,
}

impl PredictionQuery {
    pub fn to_query(&self) -> String {
        format!(
            "hour={}&weather={}&is_holiday={}",
            self.hour,
            self.weather,
            u8::from(self.is_holiday)
        )
    }
}

/// Response of `GET /predict/{road_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub road_id: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub road_name: String,
    /// `"H:00"`
    pub hour: String,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_holiday: bool,
    pub predicted_level: CongestionLevel,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Prediction {
    pub fn new(
        road_id: u64,
        road_name: impl Into<String>,
        query: &PredictionQuery,
        level: CongestionLevel,
        confidence: f64,
    ) -> Self {
        Self {
            road_id,
            road_name: road_name.into(),
            hour: format!("{}:00", query.hour),
            weather: query.weather,
            is_holiday: query.is_holiday,
            predicted_level: level,
            confidence,
            suggestion: level.suggestion().to_string(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Client-side stand-in used when the predictor is unreachable.
///
/// `jitter` is clamped to `-5..=5` and `confidence` is passed through;
/// callers supply the randomness.
pub fn demo_prediction(
    road_id: u64,
    road_name: Option<&str>,
    query: &PredictionQuery,
    jitter: i32,
    confidence: f64,
) -> Prediction {
    let mut score: i32 = 40;
    match query.hour {
        8..=10 => score += 35,
        17..=19 => score += 30,
        12..=14 => score += 15,
        _ => {}
    }
    match query.weather {
        Weather::Rain => score += 20,
        Weather::Fog => score += 10,
        _ => {}
    }
    if query.is_holiday {
        score -= 15;
    }
    let score = (score + jitter.clamp(-5, 5)).clamp(10, 95);

    let level = if score >= 80 {
        CongestionLevel::Critical
    } else if score >= 60 {
        CongestionLevel::High
    } else if score >= 35 {
        CongestionLevel::Medium
    } else {
        CongestionLevel::Low
    };

    let name = road_name
        .map(str::to_string)
        .unwrap_or_else(|| format!("Road #{}", road_id));
    Prediction::new(road_id, name, query, level, confidence).with_note("Demo prediction")
}

/// Synthetic 24-hour volume curve for the forecast chart.
pub fn synthetic_hourly_curve(weather: Weather) -> [f64; 24] {
    let mut curve = [0.0; 24];
    for (h, slot) in curve.iter_mut().enumerate() {
        let phase = std::f64::consts::PI * (h as f64 - 6.0) / 12.0;
        let mut v = 200.0 + 600.0 * phase.sin().powi(2);
        if !(6..=22).contains(&h) {
            v *= 0.2;
        }
        if weather == Weather::Rain {
            v *= 1.3;
        }
        *slot = v.round();
    }
    curve
}
