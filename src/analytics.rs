//! Aggregations over roads and readings for the embedded backend.
//!
//! Everything here is a pure function of the tables; "now" is passed in.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use flowguard_model::{
    Alert, CongestionLevel, DashboardSummary, HeatmapCell, HistoryFilter, HistoryRow,
    HourlyPoint, LevelCounts, Road, RoadComparison, RoadProfile, RoadStats, RoadStatus,
    RoadUsage, TrafficRecord, TrendPoint,
};
use std::collections::{BTreeMap, HashMap};

/// Most recent dates kept by [`trend`].
pub const TREND_DAYS: usize = 30;
const DEFAULT_PEAK_HOUR: &str = "9:00";

#[derive(Default, Clone, Copy)]
struct Mean {
    sum: f64,
    n: u32,
}

impl Mean {
    fn add(&mut self, v: u32) {
        self.sum += f64::from(v);
        self.n += 1;
    }

    fn value(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / f64::from(self.n)
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Highest-id reading per road (the last one inserted).
fn latest_inserted(records: &[TrafficRecord]) -> HashMap<u64, &TrafficRecord> {
    let mut latest: HashMap<u64, &TrafficRecord> = HashMap::new();
    for r in records {
        latest
            .entry(r.road_id)
            .and_modify(|cur| {
                if r.id > cur.id {
                    *cur = r;
                }
            })
            .or_insert(r);
    }
    latest
}

/// Full English weekday name, as SQL `DAYNAME` reports it.
fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `GET /roads`: every road with its most recent reading, by road id.
pub fn road_statuses(roads: &[Road], records: &[TrafficRecord]) -> Vec<RoadStatus> {
    let mut latest: HashMap<u64, &TrafficRecord> = HashMap::new();
    for r in records {
        let newer = latest
            .get(&r.road_id)
            .map_or(true, |cur| (r.recorded_at, r.id) > (cur.recorded_at, cur.id));
        if newer {
            latest.insert(r.road_id, r);
        }
    }

    let mut out: Vec<RoadStatus> = roads
        .iter()
        .map(|road| match latest.get(&road.id) {
            Some(r) => RoadStatus {
                road: road.clone(),
                vehicle_count: Some(r.vehicle_count),
                congestion_level: Some(r.congestion_level),
                weather: Some(r.weather),
                recorded_at: Some(r.recorded_at),
                suggestion: Some(r.congestion_level.suggestion().to_string()),
            },
            None => RoadStatus::unobserved(road.clone()),
        })
        .collect();
    out.sort_by_key(|s| s.road.id);
    out
}

/// `GET /traffic/history`: joined rows, newest first, at most [`HistoryFilter::LIMIT`].
pub fn history(roads: &[Road], records: &[TrafficRecord], filter: &HistoryFilter) -> Vec<HistoryRow> {
    let by_id: HashMap<u64, &Road> = roads.iter().map(|r| (r.id, r)).collect();
    let mut rows: Vec<&TrafficRecord> = records
        .iter()
        .filter(|r| by_id.contains_key(&r.road_id) && filter.matches(r))
        .collect();
    rows.sort_by(|a, b| (b.recorded_at, b.id).cmp(&(a.recorded_at, a.id)));
    rows.into_iter()
        .take(HistoryFilter::LIMIT)
        .filter_map(|r| {
            let road = by_id.get(&r.road_id)?;
            Some(HistoryRow {
                record: r.clone(),
                road_name: road.road_name.clone(),
                area: road.area.clone(),
                city: road.city.clone(),
            })
        })
        .collect()
}

pub fn dashboard(roads: &[Road], records: &[TrafficRecord], now: NaiveDateTime) -> DashboardSummary {
    let today = now.date();

    let current_critical = latest_inserted(records)
        .values()
        .filter(|r| r.congestion_level == CongestionLevel::Critical)
        .count() as u32;

    let mut by_hour = [Mean::default(); 24];
    let mut today_counts = LevelCounts::default();
    for r in records.iter().filter(|r| r.recorded_at.date() == today) {
        by_hour[r.recorded_at.hour() as usize].add(r.vehicle_count);
        today_counts.add(r.congestion_level);
    }

    // earliest hour wins ties
    let peak_hour = by_hour
        .iter()
        .enumerate()
        .filter(|(_, m)| m.n > 0)
        .fold(None::<(usize, f64)>, |best, (h, m)| match best {
            Some((_, v)) if v >= m.value() => best,
            _ => Some((h, m.value())),
        })
        .map(|(h, _)| format!("{}:00", h))
        .unwrap_or_else(|| DEFAULT_PEAK_HOUR.to_string());

    DashboardSummary {
        total_roads: roads.len() as u32,
        current_critical,
        peak_hour,
        today_counts,
    }
}

/// Per-road average load, busiest first. Roads without readings are omitted.
pub fn roadwise(roads: &[Road], records: &[TrafficRecord]) -> Vec<RoadUsage> {
    let mut means: HashMap<u64, Mean> = HashMap::new();
    for r in records {
        means.entry(r.road_id).or_default().add(r.vehicle_count);
    }

    let mut out: Vec<RoadUsage> = roads
        .iter()
        .filter_map(|road| {
            let mean = means.get(&road.id)?.value();
            let avg_vehicles = mean.round();
            let usage_percent = if road.capacity == 0 {
                0.0
            } else {
                round1(mean / f64::from(road.capacity) * 100.0)
            };
            Some(RoadUsage {
                road_name: road.road_name.clone(),
                area: road.area.clone(),
                capacity: road.capacity,
                avg_vehicles,
                usage_percent,
                congestion_level: CongestionLevel::from_counts(avg_vehicles, road.capacity),
            })
        })
        .collect();
    out.sort_by(|a, b| b.avg_vehicles.total_cmp(&a.avg_vehicles));
    out
}

/// Average by hour of day, optionally for one road. Hours with no data are skipped.
pub fn hourly(records: &[TrafficRecord], road_id: Option<u64>) -> Vec<HourlyPoint> {
    let mut by_hour = [Mean::default(); 24];
    for r in records
        .iter()
        .filter(|r| road_id.map_or(true, |id| r.road_id == id))
    {
        by_hour[r.recorded_at.hour() as usize].add(r.vehicle_count);
    }
    by_hour
        .iter()
        .enumerate()
        .filter(|(_, m)| m.n > 0)
        .map(|(h, m)| HourlyPoint::new(h as u32, m.value().round()))
        .collect()
}

/// Daily averages for the most recent [`TREND_DAYS`] dates, oldest first.
pub fn trend(records: &[TrafficRecord]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, Mean> = BTreeMap::new();
    for r in records {
        by_day.entry(r.recorded_at.date()).or_default().add(r.vehicle_count);
    }
    let skip = by_day.len().saturating_sub(TREND_DAYS);
    by_day
        .into_iter()
        .skip(skip)
        .map(|(date, m)| TrendPoint {
            date,
            avg_vehicles: m.value().round(),
            total_records: m.n,
        })
        .collect()
}

/// Averages per (weekday, hour), Sunday first, then by hour.
pub fn heatmap(records: &[TrafficRecord]) -> Vec<HeatmapCell> {
    let mut cells: BTreeMap<(u32, u32), (Weekday, Mean)> = BTreeMap::new();
    for r in records {
        let day = r.recorded_at.weekday();
        let key = (day.number_from_sunday(), r.recorded_at.hour());
        cells
            .entry(key)
            .or_insert((day, Mean::default()))
            .1
            .add(r.vehicle_count);
    }
    cells
        .into_iter()
        .map(|((day_num, hour), (day, m))| HeatmapCell {
            hour,
            day_name: day_name(day).to_string(),
            day_num,
            avg_vehicles: m.value().round(),
        })
        .collect()
}

/// Latest High/Critical reading per road, heaviest first.
pub fn alerts(roads: &[Road], records: &[TrafficRecord]) -> Vec<Alert> {
    let by_id: HashMap<u64, &Road> = roads.iter().map(|r| (r.id, r)).collect();
    let mut out: Vec<Alert> = latest_inserted(records)
        .into_values()
        .filter(|r| r.congestion_level.is_alert())
        .filter_map(|r| {
            let road = by_id.get(&r.road_id)?;
            Some(Alert {
                id: r.id,
                road_name: road.road_name.clone(),
                area: road.area.clone(),
                city: road.city.clone(),
                vehicle_count: r.vehicle_count,
                congestion_level: r.congestion_level,
                weather: r.weather,
                recorded_at: r.recorded_at,
                capacity: road.capacity,
                suggestion: r.congestion_level.suggestion().to_string(),
            })
        })
        .collect();
    out.sort_by(|a, b| b.vehicle_count.cmp(&a.vehicle_count).then(a.id.cmp(&b.id)));
    out
}

fn profile(road: &Road, records: &[TrafficRecord]) -> RoadProfile {
    let own: Vec<&TrafficRecord> = records.iter().filter(|r| r.road_id == road.id).collect();
    let mut mean = Mean::default();
    for r in &own {
        mean.add(r.vehicle_count);
    }
    let stats = RoadStats {
        avg_vehicles: (mean.n > 0).then(|| mean.value().round()),
        max_vehicles: own.iter().map(|r| r.vehicle_count).max(),
        min_vehicles: own.iter().map(|r| r.vehicle_count).min(),
        total_records: mean.n,
    };
    RoadProfile {
        road: road.clone(),
        hourly: hourly(records, Some(road.id)),
        stats,
    }
}

/// Side-by-side profiles; `None` when either road is unknown.
pub fn compare(
    roads: &[Road],
    records: &[TrafficRecord],
    road1: u64,
    road2: u64,
) -> Option<RoadComparison> {
    let find = |id: u64| roads.iter().find(|r| r.id == id);
    let (a, b) = (find(road1)?, find(road2)?);
    Some(RoadComparison {
        road1: profile(a, records),
        road2: profile(b, records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowguard_model::{timestamp, Weather};

    fn road(id: u64, name: &str, capacity: u32) -> Road {
        Road {
            id,
            road_name: name.to_string(),
            area: "Central".to_string(),
            city: "Bangalore".to_string(),
            capacity,
        }
    }

    fn rec(id: u64, road_id: u64, count: u32, capacity: u32, when: &str) -> TrafficRecord {
        TrafficRecord {
            id,
            road_id,
            vehicle_count: count,
            weather: Weather::Clear,
            is_holiday: false,
            recorded_at: timestamp::parse(when).unwrap(),
            congestion_level: CongestionLevel::from_counts(f64::from(count), capacity),
        }
    }

    fn fixture() -> (Vec<Road>, Vec<TrafficRecord>) {
        let roads = vec![road(1, "MG Road", 1000), road(2, "Ring Road", 1000), road(3, "Empty", 500)];
        let records = vec![
            rec(1, 1, 950, 1000, "2024-01-15 09:00:00"),
            rec(2, 1, 400, 1000, "2024-01-15 14:00:00"),
            rec(3, 2, 800, 1000, "2024-01-15 09:00:00"),
            rec(4, 2, 920, 1000, "2024-01-14 18:00:00"),
            rec(5, 2, 300, 1000, "2024-01-14 09:00:00"),
        ];
        (roads, records)
    }

    fn now() -> NaiveDateTime {
        timestamp::parse("2024-01-15 16:00:00").unwrap()
    }

    #[test]
    fn test_dashboard() {
        let (roads, records) = fixture();
        let d = dashboard(&roads, &records, now());
        assert_eq!(d.total_roads, 3);
        // latest inserted for road 2 is id 5 (Low); road 1 is id 2 (Low)
        assert_eq!(d.current_critical, 0);
        assert_eq!(d.peak_hour, "9:00");
        assert_eq!(d.today_counts.total(), 3);
        assert_eq!(d.today_counts.critical, 1);
    }

    #[test]
    fn test_dashboard_without_today() {
        let (roads, records) = fixture();
        let later = timestamp::parse("2024-02-01 08:00:00").unwrap();
        let d = dashboard(&roads, &records, later);
        assert_eq!(d.peak_hour, "9:00");
        assert_eq!(d.today_counts, LevelCounts::default());
    }

    #[test]
    fn test_road_statuses_use_latest_timestamp() {
        let (roads, records) = fixture();
        let statuses = road_statuses(&roads, &records);
        assert_eq!(statuses.len(), 3);
        // road 2: newest by recorded_at is id 3 (2024-01-15 09:00)
        assert_eq!(statuses[1].vehicle_count, Some(800));
        assert_eq!(statuses[1].congestion_level, Some(CongestionLevel::High));
        assert!(statuses[1].suggestion.is_some());
        assert_eq!(statuses[2].vehicle_count, None);
    }

    #[test]
    fn test_roadwise_sorted_and_rounded() {
        let (roads, records) = fixture();
        let rows = roadwise(&roads, &records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].road_name, "MG Road");
        assert_eq!(rows[0].avg_vehicles, 675.0);
        assert_eq!(rows[0].usage_percent, 67.5);
        assert_eq!(rows[0].congestion_level, CongestionLevel::Medium);
        assert_eq!(rows[1].road_name, "Ring Road");
        assert_eq!(rows[1].avg_vehicles, 673.0);
        assert_eq!(rows[1].usage_percent, 67.3);
    }

    #[test]
    fn test_hourly_for_road() {
        let (_, records) = fixture();
        let all = hourly(&records, None);
        assert_eq!(all.iter().map(|p| p.hour).collect::<Vec<_>>(), vec![9, 14, 18]);
        assert_eq!(all[0].avg_vehicles, 683.0);
        assert_eq!(all[0].hour_label, "9:00");

        let one = hourly(&records, Some(1));
        assert_eq!(one.len(), 2);
    }

    #[test]
    fn test_trend_keeps_recent_dates() {
        let mut records = Vec::new();
        for day in 1..=31u64 {
            records.push(rec(day, 1, 100, 1000, &format!("2024-01-{:02} 10:00:00", day)));
        }
        let points = trend(&records);
        assert_eq!(points.len(), TREND_DAYS);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(points[29].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_heatmap_order_and_day_numbers() {
        let (_, records) = fixture();
        let cells = heatmap(&records);
        // 2024-01-14 is a Sunday (1), 2024-01-15 a Monday (2)
        assert_eq!(cells[0].day_num, 1);
        assert_eq!(cells[0].day_name, "Sunday");
        assert_eq!(cells[0].hour, 9);
        assert_eq!(cells.last().unwrap().day_name, "Monday");
        assert!(cells.windows(2).all(|w| (w[0].day_num, w[0].hour) < (w[1].day_num, w[1].hour)));
    }

    #[test]
    fn test_alerts_from_latest_inserted() {
        let roads = vec![road(1, "MG Road", 1000), road(2, "Ring Road", 1000)];
        let records = vec![
            rec(1, 1, 950, 1000, "2024-01-15 09:00:00"),
            rec(2, 2, 300, 1000, "2024-01-15 09:00:00"),
            rec(3, 2, 800, 1000, "2024-01-15 10:00:00"),
        ];
        let a = alerts(&roads, &records);
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].road_name, "MG Road");
        assert_eq!(a[0].congestion_level, CongestionLevel::Critical);
        assert_eq!(a[1].id, 3);
        assert_eq!(a[1].suggestion, CongestionLevel::High.suggestion());
    }

    #[test]
    fn test_compare() {
        let (roads, records) = fixture();
        let cmp = compare(&roads, &records, 1, 3).unwrap();
        assert_eq!(cmp.road1.stats.avg_vehicles, Some(675.0));
        assert_eq!(cmp.road1.stats.max_vehicles, Some(950));
        assert_eq!(cmp.road1.stats.min_vehicles, Some(400));
        assert_eq!(cmp.road1.stats.total_records, 2);
        assert_eq!(cmp.road2.stats.total_records, 0);
        assert_eq!(cmp.road2.stats.avg_vehicles, None);
        assert!(cmp.road2.hourly.is_empty());

        assert!(compare(&roads, &records, 1, 42).is_none());
    }

    #[test]
    fn test_history_filters_and_orders() {
        let (roads, records) = fixture();
        let all = history(&roads, &records, &HistoryFilter::default());
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].record.id, 2);
        assert_eq!(all[0].road_name, "MG Road");

        let filter = HistoryFilter::from_params(Some("2"), Some("2024-01-14"), None).unwrap();
        let rows = history(&roads, &records, &filter);
        assert_eq!(rows.iter().map(|r| r.record.id).collect::<Vec<_>>(), vec![4, 5]);
    }
}
