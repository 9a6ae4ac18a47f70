//! Side-by-side comparison of two roads.

use dioxus::prelude::*;
use flowguard_model::analytics::{hourly_series, level_distribution};
use flowguard_model::{CongestionLevel, Road, RoadComparison, RoadProfile, RoadStatus};

use crate::app::api::fetch_json;
use crate::app::components::{GroupedBarChart, Layout, LineChart, PageHeader, Series};
use crate::app::demo;
use crate::app::format::{hour_labels, PLACEHOLDER};
use crate::app::notify::{use_notifier, Sourced};

const FIRST_COLOR: &str = "#f59e0b";
const SECOND_COLOR: &str = "#22d3ee";

fn parse_pair(road1: &str, road2: &str) -> Result<(u64, u64), &'static str> {
    let (Ok(a), Ok(b)) = (road1.trim().parse::<u64>(), road2.trim().parse::<u64>()) else {
        return Err("Please select both roads.");
    };
    if a == b {
        return Err("Please select two different roads.");
    }
    Ok((a, b))
}

/// Label/value rows of a road's metric block.
fn metrics(profile: &RoadProfile) -> Vec<(&'static str, String)> {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| PLACEHOLDER.to_string());
    let road = &profile.road;
    let stats = &profile.stats;
    vec![
        ("Area", or_dash((!road.area.is_empty()).then(|| road.area.clone()))),
        ("Capacity", or_dash((road.capacity > 0).then(|| road.capacity.to_string()))),
        (
            "Avg Vehicles",
            or_dash(stats.avg_vehicles.map(|v| format!("{}", v.round()))),
        ),
        ("Max Vehicles", or_dash(stats.max_vehicles.map(|v| v.to_string()))),
        ("Min Vehicles", or_dash(stats.min_vehicles.map(|v| v.to_string()))),
        (
            "Total Records",
            or_dash((stats.total_records > 0).then(|| stats.total_records.to_string())),
        ),
        ("Usage", or_dash(profile.usage_percent().map(|p| format!("{}%", p)))),
    ]
}

fn distribution(profile: &RoadProfile) -> Vec<f64> {
    level_distribution(&profile.hourly, profile.road.capacity)
        .as_array()
        .iter()
        .map(|c| f64::from(*c))
        .collect()
}

fn name_or(profile: &RoadProfile, fallback: &str) -> String {
    if profile.road.road_name.is_empty() {
        fallback.to_string()
    } else {
        profile.road.road_name.clone()
    }
}

#[component]
fn MetricBlock(profile: RoadProfile, color: String) -> Element {
    let title = name_or(&profile, "Unknown");
    rsx! {
        article { class: "card p-6", style: "border-top:3px solid {color}",
            h3 { style: "color:{color}", "{title}" }
            for (label, value) in metrics(&profile) {
                div { key: "{label}", class: "compare-metric",
                    small { class: "text-muted", "{label}" }
                    strong { "{value}" }
                }
            }
        }
    }
}

#[component]
pub fn Compare() -> Element {
    let mut notifier = use_notifier();
    let mut road1 = use_signal(String::new);
    let mut road2 = use_signal(String::new);
    let mut result = use_signal(|| None::<RoadComparison>);

    let roads = use_resource(move || async move {
        fetch_json::<Vec<RoadStatus>>("/roads")
            .await
            .map(|rows| rows.into_iter().map(|r| r.road).collect::<Vec<Road>>())
            .unwrap_or_else(|_| demo::roads())
    });

    let run = move |_| {
        let (a, b) = match parse_pair(&road1(), &road2()) {
            Ok(pair) => pair,
            Err(msg) => {
                notifier.error(msg);
                return;
            }
        };
        spawn(async move {
            notifier.show_loading("Running comparison...");
            let fetched =
                fetch_json::<RoadComparison>(&format!("/analytics/compare?road1={}&road2={}", a, b))
                    .await;
            notifier.hide_loading();
            let sourced = Sourced::from_fetch(fetched, || demo::comparison(&mut rand::thread_rng()));
            if let Some(data) = notifier.settle(sourced) {
                result.set(Some(data));
            }
        });
    };

    let reset = move |_| {
        road1.set(String::new());
        road2.set(String::new());
        result.set(None);
    };

    let road_list = roads.read().clone().unwrap_or_default();

    let results = match result() {
        None => rsx! {
            article { class: "card p-6",
                p { class: "text-muted", style: "text-align:center;",
                    "Select two roads and run a comparison"
                }
            }
        },
        Some(data) => {
            let name1 = name_or(&data.road1, "Road 1");
            let name2 = name_or(&data.road2, "Road 2");
            let hourly = vec![
                Series::new(name1.clone(), FIRST_COLOR, hourly_series(&data.road1.hourly).to_vec()),
                Series::new(name2.clone(), SECOND_COLOR, hourly_series(&data.road2.hourly).to_vec()),
            ];
            let levels = vec![
                Series::new(name1, FIRST_COLOR, distribution(&data.road1)),
                Series::new(name2, SECOND_COLOR, distribution(&data.road2)),
            ];
            let level_labels: Vec<String> =
                CongestionLevel::ALL.iter().map(|l| l.to_string()).collect();

            rsx! {
                div { class: "grid",
                    MetricBlock { profile: data.road1.clone(), color: FIRST_COLOR.to_string() }
                    MetricBlock { profile: data.road2.clone(), color: SECOND_COLOR.to_string() }
                }
                article { class: "card p-6",
                    h3 { "Hourly Profile" }
                    LineChart { labels: hour_labels(), series: hourly, fill: true }
                }
                article { class: "card p-6",
                    h3 { "Congestion Distribution" }
                    GroupedBarChart { labels: level_labels, series: levels }
                }
            }
        }
    };

    rsx! {
        Layout {
            title: "Compare".to_string(),
            nav_active: "compare".to_string(),

            PageHeader {
                title: "Compare Roads".to_string(),
                subtitle: "Side-by-side analytics comparison engine".to_string(),
            }

            article { class: "card p-6",
                div { class: "grid",
                    for (slot, sig) in [("Road A", road1), ("Road B", road2)] {
                        label { key: "{slot}", "{slot}"
                            select {
                                value: "{sig}",
                                onchange: move |e| {
                                    let mut sig = sig;
                                    sig.set(e.value());
                                },
                                option { value: "", "Select a road..." }
                                for r in road_list.clone() {
                                    option {
                                        key: "{r.id}",
                                        value: "{r.id}",
                                        selected: sig() == r.id.to_string(),
                                        "{r.picker_label()}"
                                    }
                                }
                            }
                        }
                    }
                }
                div { style: "display:flex;gap:0.5rem;",
                    button { onclick: run, "\u{21C4} Compare" }
                    button { class: "secondary outline", onclick: reset, "Reset" }
                }
            }

            {results}
        }
    }
}
