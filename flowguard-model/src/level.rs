//! Congestion levels.
//!
//! A reading's level is derived from how full the road is: the ratio of
//! observed vehicles to the road's rated capacity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Congestion level of a road reading.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CongestionLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl CongestionLevel {
    /// All levels, least to most congested.
    pub const ALL: [CongestionLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Bucket a vehicle/capacity ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.5 {
            Self::Low
        } else if ratio < 0.75 {
            Self::Medium
        } else if ratio < 0.9 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Level for `vehicle_count` vehicles on a road rated for `capacity`.
    ///
    /// A road with no rated capacity is always `Low`.
    pub fn from_counts(vehicle_count: f64, capacity: u32) -> Self {
        if capacity == 0 {
            return Self::Low;
        }
        Self::from_ratio(vehicle_count / f64::from(capacity))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Operator guidance shown next to alerts and predictions.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Low => "✅ Traffic flowing smoothly! No action needed.",
            Self::Medium => "⚠️ Moderate traffic. Consider carpooling or alternate routes.",
            Self::High => {
                "🔴 Heavy traffic! Use public transport. Avoid peak hours 8-10 AM and 5-7 PM."
            }
            Self::Critical => {
                "🚨 Emergency! Deploy traffic police immediately. Activate alternate route signals!"
            }
        }
    }

    /// Whether readings at this level raise an alert.
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    /// Position in [`Self::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings that do not name a congestion level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown congestion level: {}", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for CongestionLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Per-level tally, serialized with the level names as keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    #[serde(rename = "Low", default)]
    pub low: u32,
    #[serde(rename = "Medium", default)]
    pub medium: u32,
    #[serde(rename = "High", default)]
    pub high: u32,
    #[serde(rename = "Critical", default)]
    pub critical: u32,
}

impl LevelCounts {
    pub fn get(&self, level: CongestionLevel) -> u32 {
        match level {
            CongestionLevel::Low => self.low,
            CongestionLevel::Medium => self.medium,
            CongestionLevel::High => self.high,
            CongestionLevel::Critical => self.critical,
        }
    }

    pub fn add(&mut self, level: CongestionLevel) {
        match level {
            CongestionLevel::Low => self.low += 1,
            CongestionLevel::Medium => self.medium += 1,
            CongestionLevel::High => self.high += 1,
            CongestionLevel::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high + self.critical
    }

    /// Counts in [`CongestionLevel::ALL`] order.
    pub fn as_array(&self) -> [u32; 4] {
        [self.low, self.medium, self.high, self.critical]
    }
}

impl FromIterator<CongestionLevel> for LevelCounts {
    fn from_iter<I: IntoIterator<Item = CongestionLevel>>(iter: I) -> Self {
        let mut counts = Self::default();
        for level in iter {
            counts.add(level);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_boundaries() {
        assert_eq!(CongestionLevel::from_ratio(0.0), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_ratio(0.4999), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_ratio(0.5), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_ratio(0.75), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_ratio(0.8999), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_ratio(0.9), CongestionLevel::Critical);
        assert_eq!(CongestionLevel::from_ratio(3.0), CongestionLevel::Critical);
    }

    #[test]
    fn test_from_counts() {
        assert_eq!(CongestionLevel::from_counts(1100.0, 1200), CongestionLevel::Critical);
        assert_eq!(CongestionLevel::from_counts(680.0, 1500), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_counts(780.0, 1000), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_counts(500.0, 0), CongestionLevel::Low);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("critical".parse::<CongestionLevel>(), Ok(CongestionLevel::Critical));
        assert_eq!(" Medium ".parse::<CongestionLevel>(), Ok(CongestionLevel::Medium));
        assert!("jammed".parse::<CongestionLevel>().is_err());
        assert_eq!(CongestionLevel::High.to_string(), "High");
    }

    #[test]
    fn test_level_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&CongestionLevel::Critical).unwrap(),
            "\"Critical\""
        );
    }

    #[test]
    fn test_level_counts_wire_shape() {
        let counts: LevelCounts = [
            CongestionLevel::Low,
            CongestionLevel::Low,
            CongestionLevel::Critical,
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.total(), 3);

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["Low"], 2);
        assert_eq!(json["Critical"], 1);

        let partial: LevelCounts = serde_json::from_str(r#"{"High": 4}"#).unwrap();
        assert_eq!(partial.high, 4);
        assert_eq!(partial.low, 0);
    }

    #[test]
    fn test_alert_levels() {
        assert!(CongestionLevel::Critical.is_alert());
        assert!(CongestionLevel::High.is_alert());
        assert!(!CongestionLevel::Medium.is_alert());
    }
}
