//! Traffic readings, history rows and CSV export.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::de::{lenient_bool, lenient_opt_bool, null_default};
use crate::level::CongestionLevel;
use crate::timestamp;
use crate::weather::Weather;

/// One observation of a road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub id: u64,
    pub road_id: u64,
    pub vehicle_count: u32,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_holiday: bool,
    #[serde(with = "timestamp::wire")]
    pub recorded_at: NaiveDateTime,
    pub congestion_level: CongestionLevel,
}

/// A `GET /traffic/history` row: the reading joined with its road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub record: TrafficRecord,
    #[serde(default, deserialize_with = "null_default")]
    pub road_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_default")]
    pub city: String,
}

impl HistoryRow {
    /// Road name, or `"Road #id"` when the join came back empty.
    pub fn display_road(&self) -> String {
        if self.road_name.is_empty() {
            format!("Road #{}", self.record.road_id)
        } else {
            self.road_name.clone()
        }
    }
}

/// Body of `POST /traffic/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrafficRecord {
    pub road_id: u64,
    pub vehicle_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_holiday: Option<bool>,
    /// `YYYY-MM-DD HH:MM:SS`; the server uses "now" when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

/// Response of `POST /traffic/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficAdded {
    pub message: String,
    pub congestion_level: CongestionLevel,
    pub suggestion: String,
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Filters accepted by `GET /traffic/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub road_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub level: Option<CongestionLevel>,
}

impl HistoryFilter {
    /// Maximum rows returned by a history query.
    pub const LIMIT: usize = 100;

    /// Build from raw query-string values; empty strings mean "any".
    pub fn from_params(
        road_id: Option<&str>,
        date: Option<&str>,
        level: Option<&str>,
    ) -> Result<Self, String> {
        let road_id = non_empty(road_id)
            .map(|s| s.parse::<u64>().map_err(|_| format!("Invalid road_id: {}", s)))
            .transpose()?;
        let date = non_empty(date)
            .map(|s| {
                NaiveDate::parse_from_str(s, timestamp::DATE_FORMAT)
                    .map_err(|_| format!("Invalid date: {}", s))
            })
            .transpose()?;
        let level = non_empty(level)
            .map(|s| s.parse::<CongestionLevel>().map_err(|e| e.to_string()))
            .transpose()?;

        Ok(Self {
            road_id,
            date,
            level,
        })
    }

    pub fn matches(&self, record: &TrafficRecord) -> bool {
        self.road_id.map_or(true, |id| record.road_id == id)
            && self
                .date
                .map_or(true, |d| record.recorded_at.date() == d)
            && self
                .level
                .map_or(true, |l| record.congestion_level == l)
    }

    /// Query string without the leading `?` (empty when unfiltered).
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = self.road_id {
            parts.push(format!("road_id={}", id));
        }
        if let Some(d) = self.date {
            parts.push(format!("date={}", timestamp::format_date(&d)));
        }
        if let Some(l) = self.level {
            parts.push(format!("level={}", l));
        }
        parts.join("&")
    }
}

/// Summary tiles above the history table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub critical: usize,
    /// Rounded mean vehicle count, 0 when empty
    pub avg_vehicles: u32,
    /// High and Critical rows together
    pub high_or_worse: usize,
}

impl HistoryStats {
    pub fn from_rows(rows: &[HistoryRow]) -> Self {
        let total = rows.len();
        let sum: u64 = rows.iter().map(|r| u64::from(r.record.vehicle_count)).sum();
        let avg_vehicles = if total == 0 {
            0
        } else {
            (sum as f64 / total as f64).round() as u32
        };
        Self {
            total,
            critical: rows
                .iter()
                .filter(|r| r.record.congestion_level == CongestionLevel::Critical)
                .count(),
            avg_vehicles,
            high_or_worse: rows
                .iter()
                .filter(|r| r.record.congestion_level.is_alert())
                .count(),
        }
    }
}

/// Mean vehicle count per calendar day, oldest first.
pub fn daily_averages(rows: &[HistoryRow]) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, (u64, u32)> = BTreeMap::new();
    for row in rows {
        let entry = by_day.entry(row.record.recorded_at.date()).or_default();
        entry.0 += u64::from(row.record.vehicle_count);
        entry.1 += 1;
    }
    by_day
        .into_iter()
        .map(|(day, (sum, n))| (day, (sum as f64 / f64::from(n)).round()))
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render history rows as CSV (header included).
pub fn history_csv(rows: &[HistoryRow]) -> String {
    let mut out = String::from("Road,Date/Time,Vehicles,Level,Weather,Holiday,Area\n");
    for row in rows {
        let fields = [
            csv_field(&row.display_road()),
            timestamp::format(&row.record.recorded_at),
            row.record.vehicle_count.to_string(),
            row.record.congestion_level.to_string(),
            row.record.weather.to_string(),
            if row.record.is_holiday { "Yes" } else { "No" }.to_string(),
            csv_field(&row.area),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Download name for an export taken on `day`.
pub fn csv_filename(day: NaiveDate) -> String {
    format!("traffic_history_{}.csv", timestamp::format_date(&day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(road_id: u64, name: &str, area: &str, when: &str, count: u32) -> HistoryRow {
        HistoryRow {
            record: TrafficRecord {
                id: road_id * 100,
                road_id,
                vehicle_count: count,
                weather: Weather::Rain,
                is_holiday: false,
                recorded_at: timestamp::parse(when).unwrap(),
                congestion_level: CongestionLevel::from_counts(f64::from(count), 1000),
            },
            road_name: name.to_string(),
            area: area.to_string(),
            city: "Bangalore".to_string(),
        }
    }

    #[test]
    fn test_history_row_from_backend() {
        let json = r#"{
            "id": 7, "road_id": 2, "vehicle_count": 680, "congestion_level": "Medium",
            "weather": "Clear", "is_holiday": 0, "recorded_at": "2024-01-15 08:00:00",
            "road_name": "Ring Road", "area": "Outer Ring", "city": "Bangalore"
        }"#;
        let r: HistoryRow = serde_json::from_str(json).unwrap();
        assert_eq!(r.record.road_id, 2);
        assert!(!r.record.is_holiday);
        assert_eq!(r.display_road(), "Ring Road");
    }

    #[test]
    fn test_new_record_body_defaults() {
        let body: NewTrafficRecord =
            serde_json::from_str(r#"{"road_id": 1, "vehicle_count": 450}"#).unwrap();
        assert_eq!(body.weather, None);
        assert_eq!(body.is_holiday, None);

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("weather").is_none());
    }

    #[test]
    fn test_filter_from_params() {
        let f = HistoryFilter::from_params(Some("3"), Some(""), Some("High")).unwrap();
        assert_eq!(f.road_id, Some(3));
        assert_eq!(f.date, None);
        assert_eq!(f.level, Some(CongestionLevel::High));
        assert_eq!(f.to_query(), "road_id=3&level=High");

        assert!(HistoryFilter::from_params(Some("x"), None, None).is_err());
        assert!(HistoryFilter::from_params(None, Some("15/01/2024"), None).is_err());
        assert_eq!(HistoryFilter::default().to_query(), "");
    }

    #[test]
    fn test_filter_params_are_trimmed() {
        let f = HistoryFilter::from_params(Some(" 4 "), Some("  "), Some(" critical ")).unwrap();
        assert_eq!(f.road_id, Some(4));
        assert_eq!(f.date, None);
        assert_eq!(f.level, Some(CongestionLevel::Critical));
        assert_eq!(non_empty(Some("\t")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_filter_matches() {
        let r = row(1, "MG Road", "Central", "2024-01-15 09:00:00", 950);
        let f = HistoryFilter::from_params(None, Some("2024-01-15"), Some("critical")).unwrap();
        assert!(f.matches(&r.record));

        let other_day = HistoryFilter::from_params(None, Some("2024-01-16"), None).unwrap();
        assert!(!other_day.matches(&r.record));
    }

    #[test]
    fn test_history_csv_quotes_fields() {
        let rows = vec![
            row(1, "MG Road", "Central", "2024-01-15 09:00:00", 950),
            row(2, "Ring Road, North", "Outer \"Ring\"", "2024-01-15 10:00:00", 300),
        ];
        let csv = history_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Road,Date/Time,Vehicles,Level,Weather,Holiday,Area");
        assert_eq!(
            lines[1],
            "MG Road,2024-01-15T09:00:00,950,Critical,Rain,No,Central"
        );
        assert_eq!(
            lines[2],
            "\"Ring Road, North\",2024-01-15T10:00:00,300,Low,Rain,No,\"Outer \"\"Ring\"\"\""
        );
    }

    #[test]
    fn test_history_stats_and_daily_averages() {
        let rows = vec![
            row(1, "MG Road", "Central", "2024-01-15 09:00:00", 950),
            row(2, "Ring Road", "Outer", "2024-01-15 10:00:00", 800),
            row(3, "NH-44", "Highway", "2024-01-14 10:00:00", 301),
        ];
        let stats = HistoryStats::from_rows(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.high_or_worse, 2);
        assert_eq!(stats.avg_vehicles, 684);
        assert_eq!(HistoryStats::from_rows(&[]).avg_vehicles, 0);

        let days = daily_averages(&rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0], (NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(), 301.0));
        assert_eq!(days[1].1, 875.0);
    }

    #[test]
    fn test_csv_filename() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(csv_filename(day), "traffic_history_2024-02-09.csv");
    }
}
