//! Road registry records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::de::null_default;
use crate::level::CongestionLevel;
use crate::timestamp;
use crate::weather::Weather;

/// A monitored road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: u64,
    pub road_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_default")]
    pub city: String,
    /// Vehicles the road carries before it is considered saturated
    #[serde(default, deserialize_with = "null_default")]
    pub capacity: u32,
}

impl Road {
    /// Label used in road pickers: `"MG Road — Central"`.
    pub fn picker_label(&self) -> String {
        if self.area.is_empty() {
            self.road_name.clone()
        } else {
            format!("{} — {}", self.road_name, self.area)
        }
    }

    /// Whether the road matches a free-text search over name, area and city.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.road_name.to_lowercase().contains(&q)
            || self.area.to_lowercase().contains(&q)
            || self.city.to_lowercase().contains(&q)
    }
}

/// A `GET /roads` row: the road plus its most recent reading, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadStatus {
    #[serde(flatten)]
    pub road: Road,
    #[serde(default)]
    pub vehicle_count: Option<u32>,
    #[serde(default)]
    pub congestion_level: Option<CongestionLevel>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default, with = "timestamp::wire_opt")]
    pub recorded_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

impl RoadStatus {
    /// A road with no readings yet.
    pub fn unobserved(road: Road) -> Self {
        Self {
            road,
            vehicle_count: None,
            congestion_level: None,
            weather: None,
            recorded_at: None,
            suggestion: None,
        }
    }
}

/// Network summary shown above the road list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkStats {
    pub total: usize,
    /// Roads in a highway area or rated above 1500 vehicles
    pub highways: usize,
    /// Roads rated 800..=1500 vehicles
    pub arterial: usize,
    /// Rough length estimate: one km per 200 vehicles of capacity
    pub approx_km: f64,
}

impl NetworkStats {
    pub fn from_roads<'a>(roads: impl IntoIterator<Item = &'a Road>) -> Self {
        let mut stats = Self::default();
        for road in roads {
            stats.total += 1;
            if road.area.to_lowercase().contains("highway") || road.capacity > 1500 {
                stats.highways += 1;
            }
            if (800..=1500).contains(&road.capacity) {
                stats.arterial += 1;
            }
            stats.approx_km += f64::from(road.capacity) / 200.0;
        }
        stats
    }
}

/// Body of `POST /road/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoad {
    pub road_name: String,
    pub area: String,
    pub city: String,
    pub capacity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mg_road() -> Road {
        Road {
            id: 1,
            road_name: "MG Road".to_string(),
            area: "Central".to_string(),
            city: "Bangalore".to_string(),
            capacity: 1200,
        }
    }

    #[test]
    fn test_road_search() {
        let road = mg_road();
        assert!(road.matches("mg"));
        assert!(road.matches("CENTRAL"));
        assert!(road.matches("bangalore"));
        assert!(road.matches("  "));
        assert!(!road.matches("ring"));
    }

    #[test]
    fn test_picker_label() {
        assert_eq!(mg_road().picker_label(), "MG Road — Central");
        let bare = Road {
            area: String::new(),
            ..mg_road()
        };
        assert_eq!(bare.picker_label(), "MG Road");
    }

    #[test]
    fn test_network_stats() {
        let highway = Road {
            id: 2,
            road_name: "NH-44".to_string(),
            area: "Highway".to_string(),
            capacity: 1800,
            ..mg_road()
        };
        let stats = NetworkStats::from_roads([&mg_road(), &highway]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.highways, 1);
        assert_eq!(stats.arterial, 1);
        assert_eq!(stats.approx_km, 15.0);
    }

    #[test]
    fn test_road_status_from_backend_row() {
        let json = r#"{
            "id": 3, "road_name": "NH-44", "area": "Highway", "city": "Bangalore",
            "capacity": 1800, "vehicle_count": 1650, "congestion_level": "Critical",
            "weather": "Rain", "recorded_at": "Mon, 15 Jan 2024 09:00:00 GMT",
            "suggestion": "Deploy traffic police!"
        }"#;
        let status: RoadStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.road.capacity, 1800);
        assert_eq!(status.congestion_level, Some(CongestionLevel::Critical));
        assert_eq!(status.weather, Some(Weather::Rain));
        assert!(status.recorded_at.is_some());
    }

    #[test]
    fn test_road_status_without_readings() {
        let json = r#"{
            "id": 9, "road_name": "New Link", "area": null, "city": "Pune",
            "capacity": 900, "vehicle_count": null, "congestion_level": null,
            "weather": null, "recorded_at": null
        }"#;
        let status: RoadStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.road.area, "");
        assert_eq!(status.vehicle_count, None);
        assert_eq!(status.congestion_level, None);
        assert_eq!(status.recorded_at, None);
    }
}
