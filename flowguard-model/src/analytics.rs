//! Aggregates served under `/analytics/*`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::de::{lenient_f64, lenient_opt_f64, null_default};
use crate::level::{CongestionLevel, LevelCounts};
use crate::road::Road;
use crate::timestamp;

/// `GET /analytics/dashboard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_roads: u32,
    pub current_critical: u32,
    /// `"H:00"` of today's busiest hour
    #[serde(default, deserialize_with = "null_default")]
    pub peak_hour: String,
    #[serde(default)]
    pub today_counts: LevelCounts,
}

/// One row of `GET /analytics/roadwise`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadUsage {
    pub road_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_default")]
    pub capacity: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_vehicles: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usage_percent: f64,
    #[serde(default)]
    pub congestion_level: CongestionLevel,
}

/// Average volume for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub hour: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_vehicles: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hour_label: String,
}

impl HourlyPoint {
    pub fn new(hour: u32, avg_vehicles: f64) -> Self {
        Self {
            hour,
            avg_vehicles,
            hour_label: format!("{}:00", hour),
        }
    }

    /// The backend's label, or `"H:00"` when it sent none.
    pub fn label(&self) -> String {
        if self.hour_label.is_empty() {
            format!("{}:00", self.hour)
        } else {
            self.hour_label.clone()
        }
    }
}

/// One day of `GET /analytics/trend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "timestamp::date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_vehicles: f64,
    #[serde(default)]
    pub total_records: u32,
}

/// One (weekday, hour) cell of `GET /analytics/heatmap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub hour: u32,
    pub day_name: String,
    /// Sunday = 1 … Saturday = 7
    pub day_num: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_vehicles: f64,
}

/// Aggregate stats for one road in a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadStats {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub avg_vehicles: Option<f64>,
    #[serde(default)]
    pub max_vehicles: Option<u32>,
    #[serde(default)]
    pub min_vehicles: Option<u32>,
    #[serde(default)]
    pub total_records: u32,
}

/// A road with its hourly profile and stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadProfile {
    pub road: Road,
    #[serde(default)]
    pub hourly: Vec<HourlyPoint>,
    #[serde(default)]
    pub stats: RoadStats,
}

impl RoadProfile {
    /// Average load as a whole percent of capacity, if both are known.
    pub fn usage_percent(&self) -> Option<u32> {
        let avg = self.stats.avg_vehicles.filter(|a| *a > 0.0)?;
        if self.road.capacity == 0 {
            return None;
        }
        Some((avg / f64::from(self.road.capacity) * 100.0).round() as u32)
    }
}

/// `GET /analytics/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadComparison {
    pub road1: RoadProfile,
    pub road2: RoadProfile,
}

/// Spread sparse hourly points over a 24-slot array; missing hours stay 0.
pub fn hourly_series(points: &[HourlyPoint]) -> [f64; 24] {
    let mut series = [0.0; 24];
    for p in points {
        if let Some(slot) = series.get_mut(p.hour as usize) {
            *slot = p.avg_vehicles;
        }
    }
    series
}

/// How many hours of a profile fall in each congestion level.
///
/// Roads without a rated capacity are bucketed against 1000 vehicles.
pub fn level_distribution(points: &[HourlyPoint], capacity: u32) -> LevelCounts {
    let capacity = if capacity == 0 { 1000 } else { capacity };
    points
        .iter()
        .map(|p| CongestionLevel::from_counts(p.avg_vehicles, capacity))
        .collect()
}

/// Collapse heatmap cells to one average per hour of the day.
pub fn heatmap_by_hour(cells: &[HeatmapCell]) -> [f64; 24] {
    let mut sums = [0.0; 24];
    let mut counts = [0u32; 24];
    for cell in cells {
        let h = cell.hour as usize;
        if h < 24 {
            sums[h] += cell.avg_vehicles;
            counts[h] += 1;
        }
    }
    let mut out = [0.0; 24];
    for h in 0..24 {
        if counts[h] > 0 {
            out[h] = (sums[h] / f64::from(counts[h])).round();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roadwise_with_decimal_strings() {
        let json = r#"[{"road_name": "MG Road", "area": "Central", "capacity": 1200,
            "avg_vehicles": "920", "usage_percent": "76.7", "congestion_level": "High"}]"#;
        let rows: Vec<RoadUsage> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].avg_vehicles, 920.0);
        assert_eq!(rows[0].usage_percent, 76.7);
    }

    #[test]
    fn test_hourly_series_fills_gaps() {
        let points = vec![HourlyPoint::new(8, 900.0), HourlyPoint::new(17, 850.0)];
        let series = hourly_series(&points);
        assert_eq!(series[8], 900.0);
        assert_eq!(series[17], 850.0);
        assert_eq!(series[0], 0.0);
        assert_eq!(series.iter().filter(|v| **v > 0.0).count(), 2);
    }

    #[test]
    fn test_hourly_label_fallback() {
        let p: HourlyPoint = serde_json::from_str(r#"{"hour": 7, "avg_vehicles": 10}"#).unwrap();
        assert_eq!(p.label(), "7:00");
    }

    #[test]
    fn test_level_distribution() {
        let points = vec![
            HourlyPoint::new(2, 100.0),
            HourlyPoint::new(9, 950.0),
            HourlyPoint::new(12, 600.0),
            HourlyPoint::new(18, 800.0),
        ];
        let dist = level_distribution(&points, 1000);
        assert_eq!(dist.as_array(), [1, 1, 1, 1]);

        let uncapped = level_distribution(&points, 0);
        assert_eq!(uncapped, dist);
    }

    #[test]
    fn test_heatmap_by_hour_averages_days() {
        let cells = vec![
            HeatmapCell {
                hour: 9,
                day_name: "Monday".into(),
                day_num: 2,
                avg_vehicles: 900.0,
            },
            HeatmapCell {
                hour: 9,
                day_name: "Sunday".into(),
                day_num: 1,
                avg_vehicles: 401.0,
            },
        ];
        let by_hour = heatmap_by_hour(&cells);
        assert_eq!(by_hour[9], 651.0);
        assert_eq!(by_hour[10], 0.0);
    }

    #[test]
    fn test_comparison_from_backend() {
        let json = r#"{
            "road1": {
                "road": {"id": 1, "road_name": "MG Road", "area": "Central", "city": "Bangalore", "capacity": 1200},
                "hourly": [{"hour": 9, "avg_vehicles": "1000"}],
                "stats": {"avg_vehicles": "780", "max_vehicles": 1180, "min_vehicles": 120, "total_records": 156}
            },
            "road2": {
                "road": {"id": 2, "road_name": "New Road", "area": null, "city": "Pune", "capacity": 1000},
                "hourly": [],
                "stats": {"avg_vehicles": null, "max_vehicles": null, "min_vehicles": null, "total_records": 0}
            }
        }"#;
        let cmp: RoadComparison = serde_json::from_str(json).unwrap();
        assert_eq!(cmp.road1.usage_percent(), Some(65));
        assert_eq!(cmp.road2.usage_percent(), None);
        assert_eq!(cmp.road2.stats.max_vehicles, None);
    }

    #[test]
    fn test_trend_date_forms() {
        let json = r#"[{"date": "Mon, 15 Jan 2024 00:00:00 GMT", "avg_vehicles": "512", "total_records": 24},
                       {"date": "2024-01-16", "avg_vehicles": 480, "total_records": 24}]"#;
        let points: Vec<TrendPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(points[1].avg_vehicles, 480.0);
    }
}
