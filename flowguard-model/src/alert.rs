//! Congestion alerts raised by High and Critical readings.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::de::null_default;
use crate::level::CongestionLevel;
use crate::timestamp;
use crate::weather::Weather;

/// Latest High/Critical reading of a road, as returned by `GET /analytics/alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub road_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_default")]
    pub city: String,
    pub vehicle_count: u32,
    pub congestion_level: CongestionLevel,
    #[serde(default)]
    pub weather: Weather,
    #[serde(with = "timestamp::wire")]
    pub recorded_at: NaiveDateTime,
    #[serde(default, deserialize_with = "null_default")]
    pub capacity: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub suggestion: String,
}

impl Alert {
    /// Share of capacity in use, rounded to a whole percent.
    pub fn usage_percent(&self) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        (f64::from(self.vehicle_count) / f64::from(self.capacity) * 100.0).round() as u32
    }
}

/// The level chip selected on the alerts page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertLevelFilter {
    #[default]
    All,
    Critical,
    High,
}

impl AlertLevelFilter {
    pub const ALL: [AlertLevelFilter; 3] = [Self::All, Self::Critical, Self::High];

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Critical => "Critical",
            Self::High => "High",
        }
    }

    fn accepts(&self, level: CongestionLevel) -> bool {
        match self {
            Self::All => true,
            Self::Critical => level == CongestionLevel::Critical,
            Self::High => level == CongestionLevel::High,
        }
    }
}

/// Level chip plus free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub level: AlertLevelFilter,
    pub query: String,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        if !self.level.accepts(alert.congestion_level) {
            return false;
        }
        let q = self.query.trim().to_lowercase();
        q.is_empty()
            || alert.road_name.to_lowercase().contains(&q)
            || alert.area.to_lowercase().contains(&q)
            || alert.congestion_level.as_str().to_lowercase().contains(&q)
            || alert.suggestion.to_lowercase().contains(&q)
    }

    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        alerts.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Counters shown above the alert feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertStats {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub today: usize,
}

impl AlertStats {
    pub fn from_alerts(alerts: &[Alert], today: NaiveDate) -> Self {
        let count = |pred: &dyn Fn(&Alert) -> bool| alerts.iter().filter(|a| pred(a)).count();
        Self {
            total: alerts.len(),
            critical: count(&|a| a.congestion_level == CongestionLevel::Critical),
            high: count(&|a| a.congestion_level == CongestionLevel::High),
            today: count(&|a| a.recorded_at.date() == today),
        }
    }
}
