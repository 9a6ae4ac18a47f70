//! Alert monitor: High and Critical readings, filterable by level and text.

use dioxus::prelude::*;
use flowguard_model::{Alert, AlertFilter, AlertLevelFilter, AlertStats, CongestionLevel};

use crate::app::api::fetch_json;
use crate::app::components::{Doughnut, EmptyState, Layout, PageHeader, Slice, StatTile};
use crate::app::demo;
use crate::app::format::{format_date_time, level_color};
use crate::app::notify::use_notifier;
use crate::app::timer::local_now;

fn distribution(stats: &AlertStats) -> Vec<Slice> {
    vec![
        Slice::new(
            "Critical",
            level_color(Some(CongestionLevel::Critical)),
            stats.critical as f64,
        ),
        Slice::new(
            "High",
            level_color(Some(CongestionLevel::High)),
            stats.high as f64,
        ),
    ]
}

#[component]
pub fn Alerts() -> Element {
    let notifier = use_notifier();
    let mut level = use_signal(AlertLevelFilter::default);
    let mut query = use_signal(String::new);

    let mut alerts = use_resource(move || async move {
        let mut notifier = notifier;
        notifier.or_demo(fetch_json::<Vec<Alert>>("/analytics/alerts").await, || {
            demo::alerts(local_now())
        })
    });

    let body = match alerts.read().clone() {
        None => rsx! {
            div { class: "card p-6", aria_busy: "true", "Loading alerts..." }
        },
        Some(all) => {
            let stats = AlertStats::from_alerts(&all, local_now().date());
            let filter = AlertFilter {
                level: level(),
                query: query(),
            };
            let shown: Vec<Alert> = filter.apply(&all).into_iter().cloned().collect();

            rsx! {
                div { class: "stat-grid",
                    StatTile { label: "Total Alerts".to_string(), value: stats.total.to_string(), icon: "\u{26A0}".to_string(), color: "#f59e0b".to_string() }
                    StatTile { label: "Critical".to_string(), value: stats.critical.to_string(), icon: "\u{25A0}".to_string(), color: "#ef4444".to_string() }
                    StatTile { label: "High".to_string(), value: stats.high.to_string(), icon: "\u{25B2}".to_string(), color: "#f97316".to_string() }
                    StatTile { label: "Today".to_string(), value: stats.today.to_string(), icon: "\u{25F7}".to_string() }
                }

                div { class: "chart-grid",
                    article { class: "card p-6",
                        if shown.is_empty() {
                            EmptyState {
                                icon: "\u{26A0}".to_string(),
                                title: "No Alerts Found".to_string(),
                                message: "All roads are running smoothly or no matches found".to_string(),
                            }
                        }
                        for a in shown {
                            {
                                let color = level_color(Some(a.congestion_level));
                                let icon = if a.congestion_level == CongestionLevel::Critical { "\u{25A0}" } else { "\u{25B2}" };
                                rsx! {
                                    div { key: "{a.id}", class: "alert-card", style: "border-left-color:{color}",
                                        span { style: "color:{color};font-size:1.4rem;", "{icon}" }
                                        div { style: "flex:1",
                                            strong { "{a.road_name}" }
                                            br {}
                                            small { class: "text-muted",
                                                "{a.area} \u{00B7} {a.city} \u{00B7} {a.vehicle_count} vehicles \u{00B7} {a.usage_percent()}% capacity \u{00B7} {a.weather}"
                                            }
                                            if !a.suggestion.is_empty() {
                                                p { style: "margin:6px 0 0;font-size:0.85rem;", "{a.suggestion}" }
                                            }
                                        }
                                        small { class: "text-muted", "{format_date_time(Some(a.recorded_at))}" }
                                    }
                                }
                            }
                        }
                    }
                    article { class: "card p-6",
                        h3 { "Distribution" }
                        Doughnut { slices: distribution(&stats) }
                    }
                }
            }
        }
    };

    rsx! {
        Layout {
            title: "Alerts".to_string(),
            nav_active: "alerts".to_string(),

            PageHeader {
                title: "Traffic Alerts".to_string(),
                subtitle: "Critical and high congestion incident monitor".to_string(),
            }

            div { class: "toolbar",
                div { class: "chips",
                    for f in AlertLevelFilter::ALL {
                        button {
                            key: "{f.label()}",
                            class: if level() == f { "chip active" } else { "chip outline" },
                            onclick: move |_| level.set(f),
                            "{f.label()}"
                        }
                    }
                }
                input {
                    r#type: "search",
                    placeholder: "Search road, area or advice...",
                    value: "{query}",
                    oninput: move |e| query.set(e.value()),
                }
                button { class: "outline", onclick: move |_| alerts.restart(), "\u{21BB} Refresh" }
            }

            {body}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_slices() {
        let stats = AlertStats {
            total: 5,
            critical: 2,
            high: 3,
            today: 1,
        };
        let slices = distribution(&stats);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0], Slice::new("Critical", "#ef4444", 2.0));
        assert_eq!(slices[1], Slice::new("High", "#f97316", 3.0));
    }
}
