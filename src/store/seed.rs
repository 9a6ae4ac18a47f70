//! Deterministic demo network: five Bangalore roads with two weeks of
//! hourly readings ending at the current hour.

use chrono::{Datelike, Duration, NaiveDateTime, Weekday};
use flowguard_model::{CongestionLevel, NewRoad, Weather};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::NewReading;

const DEMO_SEED: u64 = 42;
const DEMO_CITY: &str = "Bangalore";
const DEMO_DAYS: i64 = 14;

/// `(name, area, capacity)`
pub const DEMO_ROADS: [(&str, &str, u32); 5] = [
    ("MG Road", "Central", 1200),
    ("Ring Road", "Outer Ring", 1500),
    ("NH-44", "Highway", 1800),
    ("Residency Road", "CBD", 1000),
    ("Whitefield Road", "East", 1000),
];

/// Typical share of capacity in use at `hour`.
fn demo_load(hour: u32) -> f64 {
    match hour {
        0..=4 => 0.12,
        5 => 0.25,
        6..=7 => 0.5,
        8..=10 => 0.86,
        11 => 0.65,
        12..=13 => 0.7,
        14..=16 => 0.6,
        17..=19 => 0.9,
        20..=21 => 0.55,
        _ => 0.3,
    }
}

fn roll_weather(rng: &mut ChaCha8Rng) -> Weather {
    let r: f64 = rng.gen();
    if r < 0.72 {
        Weather::Clear
    } else if r < 0.86 {
        Weather::Rain
    } else if r < 0.95 {
        Weather::Fog
    } else if r < 0.98 {
        Weather::Snow
    } else {
        Weather::Storm
    }
}

fn weather_factor(weather: Weather) -> f64 {
    match weather {
        Weather::Clear => 1.0,
        Weather::Rain => 1.15,
        Weather::Fog => 1.08,
        Weather::Snow | Weather::Storm => 1.2,
    }
}

/// Roads plus `(road index, reading)` pairs; readings carry a zero road id.
pub(super) fn generate(now: NaiveDateTime) -> (Vec<NewRoad>, Vec<(usize, NewReading)>) {
    let mut rng = ChaCha8Rng::seed_from_u64(DEMO_SEED);

    let roads = DEMO_ROADS
        .iter()
        .map(|(name, area, capacity)| NewRoad {
            road_name: name.to_string(),
            area: area.to_string(),
            city: DEMO_CITY.to_string(),
            capacity: *capacity,
        })
        .collect::<Vec<_>>();

    let first_day = now.date() - Duration::days(DEMO_DAYS - 1);
    let mut readings = Vec::new();

    for day in first_day.iter_days().take(DEMO_DAYS as usize) {
        let is_holiday = day.weekday() == Weekday::Sun;
        for hour in 0..24 {
            let Some(recorded_at) = day.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            if recorded_at > now {
                break;
            }
            let weather = roll_weather(&mut rng);
            for (index, (_, _, capacity)) in DEMO_ROADS.iter().enumerate() {
                let mut load = demo_load(hour) * weather_factor(weather);
                if is_holiday {
                    load *= 0.7;
                }
                load *= rng.gen_range(0.85..1.15);
                let vehicle_count = (f64::from(*capacity) * load).round() as u32;
                readings.push((
                    index,
                    NewReading {
                        road_id: 0,
                        vehicle_count,
                        congestion_level: CongestionLevel::from_counts(
                            f64::from(vehicle_count),
                            *capacity,
                        ),
                        weather,
                        is_holiday,
                        recorded_at,
                    },
                ));
            }
        }
    }

    tracing::debug!(
        roads = roads.len(),
        readings = readings.len(),
        "Generated demo traffic"
    );
    (roads, readings)
}
