//! Stand-in datasets shown while the backend is unreachable.

use chrono::{Duration, NaiveDateTime};
use flowguard_model::{
    Alert, CongestionLevel, DashboardSummary, HeatmapCell, HistoryRow, HourlyPoint, LevelCounts, Road,
    RoadComparison, RoadProfile, RoadStats, RoadStatus, RoadUsage, TrafficRecord, TrendPoint,
    Weather,
};
use rand::Rng;

use CongestionLevel::{Critical, High, Low, Medium};

fn road(id: u64, name: &str, area: &str, capacity: u32) -> Road {
    Road {
        id,
        road_name: name.to_string(),
        area: area.to_string(),
        city: "Bangalore".to_string(),
        capacity,
    }
}

/// Road pickers on the predict, add-traffic and compare pages.
pub fn roads() -> Vec<Road> {
    vec![
        road(1, "MG Road", "Central", 1200),
        road(2, "Ring Road", "Outer Ring", 1500),
        road(3, "NH-44", "Highway", 1800),
        road(4, "Residency Road", "CBD", 1000),
    ]
}

/// The roads page list, each with a latest reading.
pub fn road_statuses() -> Vec<RoadStatus> {
    let rows = [
        (road(1, "MG Road", "Central", 1200), 950, High, Weather::Clear),
        (road(2, "Ring Road", "Outer Ring", 1500), 680, Medium, Weather::Clear),
        (road(3, "NH-44", "Highway", 1800), 1650, Critical, Weather::Rain),
        (road(4, "Residency Road", "CBD", 1000), 320, Low, Weather::Clear),
        (road(5, "Whitefield Road", "East", 1000), 780, High, Weather::Fog),
    ];
    rows.into_iter()
        .map(|(road, count, level, weather)| RoadStatus {
            road,
            vehicle_count: Some(count),
            congestion_level: Some(level),
            weather: Some(weather),
            recorded_at: None,
            suggestion: Some(level.suggestion().to_string()),
        })
        .collect()
}

pub fn dashboard() -> DashboardSummary {
    DashboardSummary {
        total_roads: 12,
        current_critical: 3,
        peak_hour: "9:00".to_string(),
        today_counts: LevelCounts {
            low: 18,
            medium: 12,
            high: 6,
            critical: 3,
        },
    }
}

pub fn roadwise() -> Vec<RoadUsage> {
    let rows = [
        ("MG Road", "Central", 920.0, 85.2, 1200, High),
        ("Ring Road", "Outer", 680.0, 62.1, 1500, Medium),
        ("NH-44", "Highway", 1100.0, 92.0, 1800, Critical),
        ("Residency Road", "CBD", 450.0, 45.0, 1000, Low),
        ("Whitefield Rd", "East", 780.0, 78.0, 1000, High),
    ];
    rows.into_iter()
        .map(|(name, area, avg, usage, capacity, level)| RoadUsage {
            road_name: name.to_string(),
            area: area.to_string(),
            capacity,
            avg_vehicles: avg,
            usage_percent: usage,
            congestion_level: level,
        })
        .collect()
}

/// Daytime sine curve; night hours keep a fifth of the swing.
fn curve_value(hour: u32) -> f64 {
    let phase = std::f64::consts::PI * (f64::from(hour) - 6.0) / 12.0;
    let damp = if (6..=22).contains(&hour) { 1.0 } else { 0.2 };
    200.0 + 600.0 * phase.sin().powi(2) * damp
}

pub fn hourly() -> Vec<HourlyPoint> {
    (0..24)
        .map(|h| HourlyPoint::new(h, curve_value(h).round()))
        .collect()
}

/// One week of (weekday, hour) cells; weekends run at 70% of the weekday curve.
pub fn heatmap() -> Vec<HeatmapCell> {
    const DAYS: [&str; 7] = [
        "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
    ];
    DAYS.iter()
        .zip(1u32..)
        .flat_map(|(day, num)| {
            let factor = if num == 1 || num == 7 { 0.7 } else { 1.0 };
            (0..24).map(move |h| HeatmapCell {
                hour: h,
                day_name: day.to_string(),
                day_num: num,
                avg_vehicles: (curve_value(h) * factor).round(),
            })
        })
        .collect()
}

/// Hourly curve with up to 100 vehicles of noise per hour.
fn noisy_hourly<R: Rng + ?Sized>(rng: &mut R) -> Vec<HourlyPoint> {
    (0..24)
        .map(|h| HourlyPoint::new(h, (curve_value(h) + rng.gen_range(0.0..100.0)).round()))
        .collect()
}

/// Fourteen days ending today.
pub fn trend<R: Rng + ?Sized>(now: NaiveDateTime, rng: &mut R) -> Vec<TrendPoint> {
    (0..14)
        .rev()
        .map(|back| TrendPoint {
            date: (now - Duration::days(back)).date(),
            avg_vehicles: rng.gen_range(400.0..=800.0_f64).round(),
            total_records: rng.gen_range(20..=50),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn alert(
    id: u64,
    name: &str,
    area: &str,
    count: u32,
    level: CongestionLevel,
    weather: Weather,
    at: NaiveDateTime,
    capacity: u32,
    suggestion: &str,
) -> Alert {
    Alert {
        id,
        road_name: name.to_string(),
        area: area.to_string(),
        city: "Bangalore".to_string(),
        vehicle_count: count,
        congestion_level: level,
        weather,
        recorded_at: at,
        capacity,
        suggestion: suggestion.to_string(),
    }
}

/// The dashboard's alert panel.
pub fn dashboard_alerts(now: NaiveDateTime) -> Vec<Alert> {
    vec![
        alert(1, "MG Road", "Central", 1100, Critical, Weather::Clear, now, 1200, "Deploy traffic police immediately!"),
        alert(2, "NH-44", "Highway", 1600, Critical, Weather::Rain, now, 1800, "Use alternate routes."),
        alert(3, "Whitefield Rd", "East", 800, High, Weather::Clear, now, 1000, "Consider public transport."),
    ]
}

/// The alerts page feed, spread over the last few hours.
pub fn alerts(now: NaiveDateTime) -> Vec<Alert> {
    let ago = |h: i64| now - Duration::hours(h);
    vec![
        alert(1, "MG Road", "Central", 1100, Critical, Weather::Clear, now, 1200, "Deploy traffic police immediately!"),
        alert(2, "NH-44", "Highway", 1650, Critical, Weather::Rain, ago(1), 1800, "Use alternate routes."),
        alert(3, "Whitefield Rd", "East", 820, High, Weather::Clear, ago(2), 1000, "Consider public transport."),
        alert(4, "Silk Board", "South", 950, High, Weather::Fog, ago(3), 1100, "Delays expected."),
    ]
}

/// Twenty-five hourly readings going back from `now` over five roads.
pub fn history<R: Rng + ?Sized>(now: NaiveDateTime, rng: &mut R) -> Vec<HistoryRow> {
    const ROADS: [(&str, &str); 5] = [
        ("MG Road", "Central"),
        ("Ring Road", "Outer"),
        ("NH-44", "Highway"),
        ("Residency Road", "CBD"),
        ("Whitefield Rd", "East"),
    ];
    const WEATHERS: [Weather; 3] = [Weather::Clear, Weather::Rain, Weather::Fog];

    (0..25u64)
        .map(|i| {
            let (name, area) = ROADS[(i % 5) as usize];
            HistoryRow {
                record: TrafficRecord {
                    id: i + 1,
                    road_id: i % 5 + 1,
                    vehicle_count: rng.gen_range(200..=1400),
                    weather: WEATHERS[rng.gen_range(0..WEATHERS.len())],
                    is_holiday: i % 7 == 0,
                    recorded_at: now - Duration::hours(i as i64),
                    congestion_level: CongestionLevel::ALL[rng.gen_range(0..4)],
                },
                road_name: name.to_string(),
                area: area.to_string(),
                city: "Bangalore".to_string(),
            }
        })
        .collect()
}

pub fn comparison<R: Rng + ?Sized>(rng: &mut R) -> RoadComparison {
    RoadComparison {
        road1: RoadProfile {
            road: road(1, "MG Road", "Central", 1200),
            hourly: noisy_hourly(rng),
            stats: RoadStats {
                avg_vehicles: Some(780.0),
                max_vehicles: Some(1180),
                min_vehicles: Some(120),
                total_records: 156,
            },
        },
        road2: RoadProfile {
            road: road(2, "Ring Road", "Outer", 1500),
            hourly: noisy_hourly(rng),
            stats: RoadStats {
                avg_vehicles: Some(620.0),
                max_vehicles: Some(1350),
                min_vehicles: Some(80),
                total_records: 142,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowguard_model::{timestamp, HistoryStats};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> NaiveDateTime {
        timestamp::parse("2024-01-15 12:30:00").unwrap()
    }

    #[test]
    fn test_hourly_curve_shape() {
        let points = hourly();
        assert_eq!(points.len(), 24);
        assert_eq!(points[0].avg_vehicles, 320.0);
        assert_eq!(points[6].avg_vehicles, 200.0);
        assert_eq!(points[12].avg_vehicles, 800.0);
        assert_eq!(points[12].label(), "12:00");
    }

    #[test]
    fn test_heatmap_week() {
        let cells = heatmap();
        assert_eq!(cells.len(), 7 * 24);
        assert_eq!(cells[0].day_name, "Sunday");
        assert_eq!(cells[0].day_num, 1);
        assert_eq!(cells[24 + 12].avg_vehicles, 800.0);
        assert_eq!(cells[12].avg_vehicles, 560.0);

        let by_hour = flowguard_model::analytics::heatmap_by_hour(&cells);
        assert!(by_hour.iter().all(|v| *v > 0.0));
        assert_eq!(by_hour[12], 731.0);
    }

    #[test]
    fn test_trend_ends_today() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = trend(now(), &mut rng);
        assert_eq!(points.len(), 14);
        assert_eq!(points[13].date, now().date());
        assert!(points
            .iter()
            .all(|p| (400.0..=800.0).contains(&p.avg_vehicles) && (20..=50).contains(&p.total_records)));
    }

    #[test]
    fn test_history_rows() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let rows = history(now(), &mut rng);
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0].record.recorded_at, now());
        assert!(rows[0].record.is_holiday);
        assert!(!rows[1].record.is_holiday);
        assert_eq!(rows[6].road_name, "Ring Road");
        assert_eq!(HistoryStats::from_rows(&rows).total, 25);
    }

    #[test]
    fn test_alert_feeds() {
        assert_eq!(dashboard_alerts(now()).len(), 3);
        let feed = alerts(now());
        assert_eq!(feed.len(), 4);
        assert_eq!(feed[3].usage_percent(), 86);
    }

    #[test]
    fn test_comparison_stats() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cmp = comparison(&mut rng);
        assert_eq!(cmp.road1.usage_percent(), Some(65));
        assert_eq!(cmp.road2.hourly.len(), 24);
        assert_eq!(road_statuses().len(), 5);
        assert_eq!(dashboard().today_counts.total(), 39);
    }
}
