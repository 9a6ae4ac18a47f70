//! Manual traffic observation entry.

use chrono::NaiveDate;
use dioxus::prelude::*;
use flowguard_model::{
    timestamp, CongestionLevel, NewTrafficRecord, Road, RoadStatus, TrafficAdded, Weather,
};

use crate::app::api::{fetch_json, post_json};
use crate::app::components::{EmptyState, Layout, LevelBadge, PageHeader};
use crate::app::demo;
use crate::app::format::{format_time, level_color, PLACEHOLDER};
use crate::app::notify::use_notifier;
use crate::app::session::{use_session, RecentSubmission};
use crate::app::timer::local_now;

/// Capacity assumed for the local level estimate when the road's is unknown.
const FALLBACK_CAPACITY: u32 = 1000;

/// Validated form input.
#[derive(Debug, Clone, PartialEq)]
struct Observation {
    road_id: u64,
    date: NaiveDate,
    hour: u32,
    vehicles: u32,
}

impl Observation {
    fn parse(road: &str, date: &str, hour: &str, vehicles: &str) -> Result<Self, &'static str> {
        let road_id = road
            .trim()
            .parse::<u64>()
            .map_err(|_| "Please select a road.")?;
        let date = NaiveDate::parse_from_str(date.trim(), timestamp::DATE_FORMAT)
            .map_err(|_| "Please select a date.")?;
        let hour = hour
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|h| *h < 24)
            .ok_or("Please select an hour.")?;
        let vehicles = vehicles
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or("Enter a valid vehicle count.")?;
        Ok(Self {
            road_id,
            date,
            hour,
            vehicles,
        })
    }

    /// `YYYY-MM-DD HH:00:00`
    fn recorded_at(&self) -> String {
        format!(
            "{} {:02}:00:00",
            timestamp::format_date(&self.date),
            self.hour
        )
    }
}

/// Level the backend would assign, for the preview and offline submissions.
fn estimate_level(vehicles: u32, road: Option<&Road>) -> CongestionLevel {
    let capacity = road
        .map(|r| r.capacity)
        .filter(|c| *c > 0)
        .unwrap_or(FALLBACK_CAPACITY);
    CongestionLevel::from_counts(f64::from(vehicles), capacity)
}

fn today() -> String {
    timestamp::format_date(&local_now().date())
}

#[component]
pub fn AddTraffic() -> Element {
    let mut session = use_session();
    let mut notifier = use_notifier();

    let mut road_id = use_signal(String::new);
    let mut date = use_signal(today);
    let mut hour = use_signal(String::new);
    let mut weather = use_signal(|| Weather::Clear);
    let mut holiday = use_signal(|| false);
    let mut vehicles = use_signal(String::new);

    let roads = use_resource(move || async move {
        fetch_json::<Vec<RoadStatus>>("/roads")
            .await
            .map(|rows| rows.into_iter().map(|r| r.road).collect::<Vec<Road>>())
            .unwrap_or_else(|e| {
                tracing::debug!("Road list unavailable: {}", e);
                demo::roads()
            })
    });

    let selected_road = move || -> Option<Road> {
        let id = road_id().parse::<u64>().ok()?;
        roads
            .read()
            .as_ref()
            .and_then(|list| list.iter().find(|r| r.id == id).cloned())
    };

    let mut reset = move || {
        road_id.set(String::new());
        date.set(today());
        hour.set(String::new());
        weather.set(Weather::Clear);
        holiday.set(false);
        vehicles.set(String::new());
    };

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let obs = match Observation::parse(&road_id(), &date(), &hour(), &vehicles()) {
            Ok(obs) => obs,
            Err(msg) => {
                notifier.error(msg);
                return;
            }
        };
        let road = selected_road();
        let road_label = road
            .as_ref()
            .map(Road::picker_label)
            .unwrap_or_else(|| format!("Road #{}", obs.road_id));
        let body = NewTrafficRecord {
            road_id: obs.road_id,
            vehicle_count: obs.vehicles,
            weather: Some(weather()),
            is_holiday: Some(holiday()),
            recorded_at: Some(obs.recorded_at()),
        };

        spawn(async move {
            notifier.show_loading("Submitting data...");
            let outcome = post_json::<_, TrafficAdded>("/traffic/add", &body).await;
            notifier.hide_loading();

            let level = match outcome {
                Ok(added) => {
                    notifier.success(format!(
                        "Traffic data added! Level: {}",
                        added.congestion_level
                    ));
                    added.congestion_level
                }
                Err(e) if e.is_offline() => {
                    tracing::warn!("Submitting offline: {}", e);
                    notifier.demo_mode();
                    let level = estimate_level(obs.vehicles, road.as_ref());
                    notifier.success(format!("Data recorded (demo). Level: {}", level));
                    level
                }
                Err(e) => {
                    notifier.error(e.user_message("Failed to submit."));
                    return;
                }
            };

            session.write().push_recent(RecentSubmission {
                road: road_label,
                vehicles: obs.vehicles,
                weather: body.weather.unwrap_or_default().to_string(),
                level: level.to_string(),
                date: timestamp::format_date(&obs.date),
                hour: obs.hour,
                time: local_now().format("%H:%M").to_string(),
            });
            reset();
        });
    };

    let road_list = roads.read().clone().unwrap_or_default();
    let recent = session.read().recent.clone();

    let preview_road = selected_road()
        .map(|r| r.picker_label())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let preview_date = if date().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        date()
    };
    let preview_hour = format_time(hour().parse::<u32>().ok().filter(|h| *h < 24));
    let preview_level = vehicles()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .map(|v| estimate_level(v, selected_road().as_ref()));

    rsx! {
        Layout {
            title: "Add Traffic".to_string(),
            nav_active: "add-traffic".to_string(),

            PageHeader {
                title: "Add Traffic Data".to_string(),
                subtitle: "Record a new traffic observation".to_string(),
            }

            div { class: "grid",
                article { class: "card p-6",
                    form { onsubmit: submit,
                        label { "Road"
                            select { value: "{road_id}", onchange: move |e| road_id.set(e.value()),
                                option { value: "", "Select a road..." }
                                for r in road_list {
                                    option {
                                        key: "{r.id}",
                                        value: "{r.id}",
                                        selected: road_id() == r.id.to_string(),
                                        "{r.picker_label()}"
                                    }
                                }
                            }
                        }
                        div { class: "grid",
                            label { "Date"
                                input { r#type: "date", value: "{date}", oninput: move |e| date.set(e.value()) }
                            }
                            label { "Hour"
                                select { value: "{hour}", onchange: move |e| hour.set(e.value()),
                                    option { value: "", "Select an hour..." }
                                    for h in 0..24u32 {
                                        option { key: "{h}", value: "{h}", selected: hour() == h.to_string(), "{format_time(Some(h))}" }
                                    }
                                }
                            }
                        }
                        div { class: "grid",
                            label { "Weather"
                                select { onchange: move |e| weather.set(Weather::from(e.value())),
                                    for w in Weather::ALL {
                                        option { key: "{w}", value: "{w}", selected: weather() == w, "{w}" }
                                    }
                                }
                            }
                            label { "Vehicle count"
                                input {
                                    r#type: "number",
                                    min: "1",
                                    placeholder: "e.g. 850",
                                    value: "{vehicles}",
                                    oninput: move |e| vehicles.set(e.value()),
                                }
                            }
                        }
                        label {
                            input { r#type: "checkbox", checked: holiday(), onchange: move |_| holiday.toggle() }
                            " Public holiday"
                        }
                        button { r#type: "submit", "\u{2795} Submit Observation" }
                    }
                }

                article { class: "card p-6",
                    h3 { "Preview" }
                    dl {
                        dt { "Road" } dd { "{preview_road}" }
                        dt { "Date" } dd { "{preview_date}" }
                        dt { "Hour" } dd { "{preview_hour}" }
                        dt { "Weather" } dd { "{weather}" }
                        dt { "Vehicles" }
                        dd {
                            if vehicles().is_empty() { "{PLACEHOLDER}" } else { "{vehicles} vehicles" }
                        }
                        dt { "Expected level" }
                        dd { LevelBadge { level: preview_level } }
                    }
                }
            }

            article { class: "card p-6",
                h3 { "Recent Submissions" }
                if recent.is_empty() {
                    EmptyState {
                        icon: "\u{1F4CB}".to_string(),
                        title: "No Submissions Yet".to_string(),
                        message: "Submit a traffic observation to see it here".to_string(),
                    }
                } else {
                    for (i, s) in recent.into_iter().enumerate() {
                        {
                            let color = level_color(s.level.parse().ok());
                            rsx! {
                                div { key: "{i}", class: "alert-row",
                                    span { class: "alert-dot", style: "background:{color}" }
                                    div { style: "flex:1",
                                        strong { "{s.road}" }
                                        br {}
                                        small { class: "text-muted",
                                            "{s.vehicles} vehicles \u{00B7} {s.weather} \u{00B7} {s.date} {s.hour}:00 \u{00B7} {s.time}"
                                        }
                                    }
                                    span { class: "badge", style: "color:{color};border-color:{color}", "{s.level}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_validation_order() {
        assert_eq!(
            Observation::parse("", "", "", ""),
            Err("Please select a road.")
        );
        assert_eq!(
            Observation::parse("2", "", "9", "500"),
            Err("Please select a date.")
        );
        assert_eq!(
            Observation::parse("2", "2024-01-15", "", "500"),
            Err("Please select an hour.")
        );
        assert_eq!(
            Observation::parse("2", "2024-01-15", "9", "0"),
            Err("Enter a valid vehicle count.")
        );
        assert_eq!(
            Observation::parse("2", "2024-01-15", "9", "-4"),
            Err("Enter a valid vehicle count.")
        );
    }

    #[test]
    fn test_recorded_at_pads_hour() {
        let obs = Observation::parse("2", "2024-01-15", "0", "500").unwrap();
        assert_eq!(obs.hour, 0);
        assert_eq!(obs.recorded_at(), "2024-01-15 00:00:00");

        let obs = Observation::parse(" 3 ", "2024-02-01", "17", "1200").unwrap();
        assert_eq!(obs.recorded_at(), "2024-02-01 17:00:00");
    }

    #[test]
    fn test_estimate_level_uses_capacity() {
        let road = Road {
            id: 3,
            road_name: "NH-44".to_string(),
            area: "Highway".to_string(),
            city: "Bangalore".to_string(),
            capacity: 1800,
        };
        assert_eq!(estimate_level(950, None), CongestionLevel::Critical);
        assert_eq!(estimate_level(950, Some(&road)), CongestionLevel::Medium);

        let unrated = Road { capacity: 0, ..road };
        assert_eq!(estimate_level(950, Some(&unrated)), CongestionLevel::Critical);
    }
}
