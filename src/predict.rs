//! Congestion forecasting for a single road.
//!
//! Roads with a short history get a rule-of-thumb estimate from their
//! average load. Otherwise the recent readings vote: each neighbour in
//! (hour, weekday, holiday, weather) space contributes `1 / (d + 0.1)` to
//! its level.

use chrono::{Datelike, Timelike, Weekday};
use flowguard_model::{CongestionLevel, Prediction, PredictionQuery, Road, TrafficRecord, Weather};
use rand::Rng;

/// Readings considered per prediction, most recent first.
pub const HISTORY_WINDOW: usize = 200;
/// Below this many readings the rule-based estimate is used.
pub const MIN_HISTORY: usize = 10;
const NEIGHBOURS: usize = 15;

pub const RULE_BASED_NOTE: &str = "Rule based prediction used";

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn load_multiplier(query: &PredictionQuery) -> f64 {
    let mut m = 1.0;
    m += match query.hour {
        8..=10 => 0.5,
        17..=19 => 0.45,
        12..=13 => 0.2,
        0..=4 => -0.5,
        _ => 0.0,
    };
    m += match query.weather {
        Weather::Rain => 0.3,
        Weather::Fog => 0.2,
        _ => 0.0,
    };
    if query.is_holiday {
        m -= 0.3;
    }
    m
}

/// Rule-of-thumb level from the road's mean count (or half its capacity).
pub fn rule_based<R: Rng + ?Sized>(
    road: &Road,
    records: &[&TrafficRecord],
    query: &PredictionQuery,
    rng: &mut R,
) -> Prediction {
    let mean = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| f64::from(r.vehicle_count)).sum::<f64>() / records.len() as f64
    };
    let base = if mean > 0.0 {
        mean
    } else {
        f64::from(road.capacity) * 0.5
    };
    let vehicles = (base * load_multiplier(query)).floor().max(0.0);
    let level = CongestionLevel::from_counts(vehicles, road.capacity);
    let confidence = round1(rng.gen_range(55.0..=70.0));

    Prediction::new(road.id, road.road_name.clone(), query, level, confidence)
        .with_note(RULE_BASED_NOTE)
}

fn weather_code(weather: Weather) -> u8 {
    match weather {
        Weather::Rain => 1,
        Weather::Fog => 2,
        _ => 0,
    }
}

fn circular(a: u32, b: u32, period: u32) -> f64 {
    let d = a.abs_diff(b) % period;
    f64::from(d.min(period - d))
}

fn distance(record: &TrafficRecord, query: &PredictionQuery, weekday: Weekday) -> f64 {
    let hour = circular(record.recorded_at.hour(), query.hour, 24) / 12.0;
    let day = circular(
        record.recorded_at.weekday().num_days_from_sunday(),
        weekday.num_days_from_sunday(),
        7,
    ) / 3.5;
    let holiday = if record.is_holiday == query.is_holiday { 0.0 } else { 1.0 };
    let weather = if weather_code(record.weather) == weather_code(query.weather) {
        0.0
    } else {
        1.0
    };
    2.0 * hour + 0.5 * day + holiday + weather
}

/// Distance-weighted vote among the nearest readings.
///
/// Returns the winning level (earliest in [`CongestionLevel::ALL`] on a tie)
/// and its share of the vote as a percentage.
pub fn nearest_neighbours(
    records: &[&TrafficRecord],
    query: &PredictionQuery,
    weekday: Weekday,
) -> (CongestionLevel, f64) {
    let mut scored: Vec<(f64, CongestionLevel)> = records
        .iter()
        .map(|r| (distance(r, query, weekday), r.congestion_level))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut votes = [0.0f64; 4];
    for (d, level) in scored.iter().take(NEIGHBOURS) {
        votes[level.index()] += 1.0 / (d + 0.1);
    }
    let total: f64 = votes.iter().sum();

    let mut winner = 0;
    for (i, v) in votes.iter().enumerate() {
        if *v > votes[winner] {
            winner = i;
        }
    }
    let confidence = if total > 0.0 {
        round1(votes[winner] / total * 100.0)
    } else {
        0.0
    };
    (CongestionLevel::ALL[winner], confidence)
}

/// Forecast the level on `road` for `query`, given every reading for it.
pub fn predict<R: Rng + ?Sized>(
    road: &Road,
    records: &[TrafficRecord],
    query: &PredictionQuery,
    weekday: Weekday,
    rng: &mut R,
) -> Prediction {
    let mut recent: Vec<&TrafficRecord> =
        records.iter().filter(|r| r.road_id == road.id).collect();
    recent.sort_by(|a, b| (b.recorded_at, b.id).cmp(&(a.recorded_at, a.id)));

    if recent.len() < MIN_HISTORY {
        tracing::debug!(
            road_id = road.id,
            readings = recent.len(),
            "Too little history, using rule-based prediction"
        );
        return rule_based(road, &recent, query, rng);
    }

    recent.truncate(HISTORY_WINDOW);
    let (level, confidence) = nearest_neighbours(&recent, query, weekday);
    Prediction::new(road.id, road.road_name.clone(), query, level, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};
    use flowguard_model::timestamp;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn road() -> Road {
        Road {
            id: 7,
            road_name: "MG Road".into(),
            area: "Central".into(),
            city: "Bangalore".into(),
            capacity: 1000,
        }
    }

    fn rec(id: u64, count: u32, at: NaiveDateTime, weather: Weather) -> TrafficRecord {
        TrafficRecord {
            id,
            road_id: 7,
            vehicle_count: count,
            weather,
            is_holiday: false,
            recorded_at: at,
            congestion_level: CongestionLevel::from_counts(f64::from(count), 1000),
        }
    }

    fn query(hour: u32, weather: Weather, is_holiday: bool) -> PredictionQuery {
        PredictionQuery {
            hour,
            weather,
            is_holiday,
        }
    }

    #[test]
    fn test_rule_based_without_history() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // base 500, evening rush + rain = 1.75 -> 875 -> High
        let p = predict(&road(), &[], &query(18, Weather::Rain, false), Weekday::Mon, &mut rng);
        assert_eq!(p.predicted_level, CongestionLevel::High);
        assert_eq!(p.note.as_deref(), Some(RULE_BASED_NOTE));
        assert!((55.0..=70.0).contains(&p.confidence));
        assert_eq!(p.hour, "18:00");
        assert_eq!(p.suggestion, CongestionLevel::High.suggestion());
    }

    #[test]
    fn test_rule_based_night_holiday() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let start = timestamp::parse("2024-01-15 00:00:00").unwrap();
        let records: Vec<TrafficRecord> = (0..3)
            .map(|i| rec(i, 600, start + Duration::hours(i as i64), Weather::Clear))
            .collect();
        // 600 * (1 - 0.5 - 0.3) = 120 -> Low
        let p = predict(&road(), &records, &query(2, Weather::Clear, true), Weekday::Mon, &mut rng);
        assert_eq!(p.predicted_level, CongestionLevel::Low);
    }

    #[test]
    fn test_neighbours_follow_history() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let start = timestamp::parse("2024-01-01 00:00:00").unwrap();
        let mut records = Vec::new();
        let mut id = 0;
        for day in 0..7 {
            for hour in 0..24i64 {
                id += 1;
                let count = if (8..=10).contains(&hour) { 950 } else { 200 };
                let at = start + Duration::days(day) + Duration::hours(hour);
                records.push(rec(id, count, at, Weather::Clear));
            }
        }

        let busy = predict(&road(), &records, &query(9, Weather::Clear, false), Weekday::Tue, &mut rng);
        assert_eq!(busy.predicted_level, CongestionLevel::Critical);
        assert!(busy.note.is_none());
        assert!(busy.confidence > 50.0 && busy.confidence <= 100.0);

        let quiet = predict(&road(), &records, &query(3, Weather::Clear, false), Weekday::Tue, &mut rng);
        assert_eq!(quiet.predicted_level, CongestionLevel::Low);
        assert_eq!(quiet.confidence, 100.0);
    }

    #[test]
    fn test_window_ignores_other_roads() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let at = timestamp::parse("2024-01-01 09:00:00").unwrap();
        let mut records: Vec<TrafficRecord> =
            (1..=20).map(|i| rec(i, 950, at, Weather::Clear)).collect();
        for r in &mut records {
            r.road_id = 8;
        }
        let p = predict(&road(), &records, &query(9, Weather::Clear, false), Weekday::Mon, &mut rng);
        assert_eq!(p.note.as_deref(), Some(RULE_BASED_NOTE));
    }

    #[test]
    fn test_circular_distance() {
        assert_eq!(circular(23, 1, 24), 2.0);
        assert_eq!(circular(0, 12, 24), 12.0);
        assert_eq!(circular(6, 0, 7), 1.0);
    }

    #[test]
    fn test_tie_prefers_lower_level() {
        let at = timestamp::parse("2024-01-01 09:00:00").unwrap();
        let a = rec(1, 100, at, Weather::Clear);
        let b = rec(2, 950, at, Weather::Clear);
        let (level, confidence) =
            nearest_neighbours(&[&a, &b], &query(9, Weather::Clear, false), Weekday::Mon);
        assert_eq!(level, CongestionLevel::Low);
        assert_eq!(confidence, 50.0);
    }
}
