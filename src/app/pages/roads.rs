//! Road network list, search and registration.

use dioxus::prelude::*;
use flowguard_model::{MessageResponse, NetworkStats, NewRoad, Road, RoadStatus};

use crate::app::api::{fetch_json, post_json};
use crate::app::components::{EmptyState, Layout, LevelBadge, PageHeader, StatTile};
use crate::app::demo;
use crate::app::notify::use_notifier;
use crate::app::session::use_session;
use crate::app::timer::local_now;
use crate::app::Route;

const DEFAULT_CAPACITY: u32 = 1000;

/// Validate the add-road form. Capacity falls back to 1000 when blank or invalid.
fn new_road(name: &str, area: &str, capacity: &str, city: &str) -> Result<NewRoad, &'static str> {
    let road_name = name.trim();
    if road_name.is_empty() {
        return Err("Road name is required.");
    }
    let capacity = capacity
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_CAPACITY);
    Ok(NewRoad {
        road_name: road_name.to_string(),
        area: area.trim().to_string(),
        city: city.to_string(),
        capacity,
    })
}

#[component]
pub fn Roads() -> Element {
    let session = use_session();
    let mut notifier = use_notifier();
    let nav = use_navigator();

    let mut query = use_signal(String::new);
    let mut name = use_signal(String::new);
    let mut area = use_signal(String::new);
    let mut capacity = use_signal(String::new);
    // Roads added while the backend is offline
    let mut offline_added = use_signal(Vec::<RoadStatus>::new);

    let mut roads = use_resource(move || async move {
        let mut notifier = notifier;
        notifier.or_demo(
            fetch_json::<Vec<RoadStatus>>("/roads").await,
            demo::road_statuses,
        )
    });

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let city = session.read().road_city().to_string();
        let body = match new_road(&name(), &area(), &capacity(), &city) {
            Ok(body) => body,
            Err(msg) => {
                notifier.error(msg);
                return;
            }
        };

        spawn(async move {
            notifier.show_loading("Adding road...");
            let outcome = post_json::<_, MessageResponse>("/road/add", &body).await;
            notifier.hide_loading();
            match outcome {
                Ok(_) => {
                    notifier.success("Road added successfully!");
                    offline_added.write().clear();
                    roads.restart();
                }
                Err(e) if e.is_offline() => {
                    tracing::warn!("Adding road offline: {}", e);
                    notifier.demo_mode();
                    let road = Road {
                        id: local_now().and_utc().timestamp_millis().unsigned_abs(),
                        road_name: body.road_name,
                        area: body.area,
                        city: body.city,
                        capacity: body.capacity,
                    };
                    offline_added.write().insert(0, RoadStatus::unobserved(road));
                    notifier.success("Road added (demo mode).");
                }
                Err(e) => {
                    notifier.error(e.user_message("Failed to add road."));
                    return;
                }
            }
            name.set(String::new());
            area.set(String::new());
            capacity.set(String::new());
        });
    };

    let list = match roads.read().clone() {
        None => rsx! {
            div { class: "card p-6", aria_busy: "true", "Loading road network..." }
        },
        Some(fetched) => {
            let all: Vec<RoadStatus> = offline_added()
                .into_iter()
                .chain(fetched)
                .collect();
            let stats = NetworkStats::from_roads(all.iter().map(|r| &r.road));
            let q = query();
            let shown: Vec<RoadStatus> = all.into_iter().filter(|r| r.road.matches(&q)).collect();

            rsx! {
                div { class: "stat-grid",
                    StatTile { label: "Total Roads".to_string(), value: stats.total.to_string(), icon: "\u{25EB}".to_string() }
                    StatTile { label: "Highways".to_string(), value: stats.highways.to_string(), icon: "\u{25B2}".to_string(), color: "#f97316".to_string() }
                    StatTile { label: "Arterial".to_string(), value: stats.arterial.to_string(), icon: "\u{25C9}".to_string(), color: "#f59e0b".to_string() }
                    StatTile { label: "Approx. km".to_string(), value: format!("{:.1}", stats.approx_km), icon: "\u{25F7}".to_string() }
                }

                if shown.is_empty() {
                    article { class: "card p-6",
                        EmptyState {
                            icon: "\u{25EB}".to_string(),
                            title: "No Roads Found".to_string(),
                            message: "Add your first road using the form".to_string(),
                        }
                    }
                }
                for (i, r) in shown.into_iter().enumerate() {
                    {
                        let id = r.road.id;
                        let number = format!("#{:02}", i + 1);
                        rsx! {
                            div {
                                key: "{id}",
                                class: "road-card",
                                onclick: move |_| {
                                    let _ = nav.push(Route::Predict { road: id.to_string() });
                                },
                                span { class: "road-num", "{number}" }
                                div { style: "flex:1",
                                    strong { "{r.road.road_name}" }
                                    br {}
                                    small { class: "text-muted",
                                        "{r.road.area} \u{00B7} {r.road.city} \u{00B7} Cap: {r.road.capacity}"
                                    }
                                }
                                LevelBadge { level: r.congestion_level }
                                if let Some(count) = r.vehicle_count {
                                    small { class: "text-muted", "{count} veh" }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        Layout {
            title: "Roads".to_string(),
            nav_active: "roads".to_string(),

            PageHeader {
                title: "Road Network".to_string(),
                subtitle: "Manage and monitor all registered roads".to_string(),
            }

            div { class: "grid",
                div {
                    input {
                        r#type: "search",
                        placeholder: "Search roads, areas, cities...",
                        value: "{query}",
                        oninput: move |e| query.set(e.value()),
                    }
                    {list}
                }

                article { class: "card p-6",
                    h3 { "Add Road" }
                    form { onsubmit: submit,
                        label { "Road name"
                            input { value: "{name}", placeholder: "e.g. Outer Ring Road", oninput: move |e| name.set(e.value()) }
                        }
                        label { "Area"
                            input { value: "{area}", placeholder: "e.g. Marathahalli", oninput: move |e| area.set(e.value()) }
                        }
                        label { "Capacity (vehicles)"
                            input {
                                r#type: "number",
                                min: "1",
                                placeholder: "{DEFAULT_CAPACITY}",
                                value: "{capacity}",
                                oninput: move |e| capacity.set(e.value()),
                            }
                        }
                        small { class: "text-muted", "City: {session.read().road_city()}" }
                        button { r#type: "submit", "\u{2795} Add Road" }
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
    fn test_new_road_requires_name() {
        assert_eq!(new_road("  ", "Central", "900", "Pune"), Err("Road name is required."));
    }

    #[test]
    fn test_new_road_capacity_default() {
        let road = new_road(" Hosur Road ", " South ", "", "Bangalore").unwrap();
        assert_eq!(road.road_name, "Hosur Road");
        assert_eq!(road.area, "South");
        assert_eq!(road.capacity, 1000);

        assert_eq!(new_road("A", "", "abc", "Pune").unwrap().capacity, 1000);
        assert_eq!(new_road("A", "", "0", "Pune").unwrap().capacity, 1000);
        assert_eq!(new_road("A", "", "1500", "Pune").unwrap().capacity, 1500);
    }
}
