//! Dashboard page component.
//!
//! Six analytics calls run in parallel; each one that fails is replaced by
//! its demo dataset independently.

use dioxus::prelude::*;
use flowguard_model::analytics::heatmap_by_hour;
use flowguard_model::{
    Alert, CongestionLevel, DashboardSummary, HeatmapCell, HourlyPoint, RoadUsage, TrendPoint,
};

use crate::app::api::fetch_json;
use crate::app::components::{
    level_slices, BarChart, Doughnut, EmptyState, Heatmap, Layout, LevelBadge, LineChart,
    PageHeader, Series, StatTile,
};
use crate::app::demo;
use crate::app::format::{format_day, level_color};
use crate::app::notify::use_notifier;
use crate::app::timer::local_now;

/// Bars shown in the roadwise chart.
const TOP_ROADS: usize = 8;
/// Alerts listed on the dashboard.
const ALERT_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
struct DashboardData {
    summary: DashboardSummary,
    roadwise: Vec<RoadUsage>,
    hourly: Vec<HourlyPoint>,
    trend: Vec<TrendPoint>,
    heatmap: Vec<HeatmapCell>,
    alerts: Vec<Alert>,
}

/// Dashboard page component.
#[component]
pub fn Dashboard() -> Element {
    let notifier = use_notifier();

    let mut data = use_resource(move || async move {
        let mut notifier = notifier;
        let (summary, roadwise, hourly, trend, heatmap, alerts) = futures::join!(
            fetch_json::<DashboardSummary>("/analytics/dashboard"),
            fetch_json::<Vec<RoadUsage>>("/analytics/roadwise"),
            fetch_json::<Vec<HourlyPoint>>("/analytics/hourly"),
            fetch_json::<Vec<TrendPoint>>("/analytics/trend"),
            fetch_json::<Vec<HeatmapCell>>("/analytics/heatmap"),
            fetch_json::<Vec<Alert>>("/analytics/alerts"),
        );

        let now = local_now();
        let mut rng = rand::thread_rng();
        DashboardData {
            summary: notifier.or_demo(summary, demo::dashboard),
            roadwise: notifier.or_demo(roadwise, demo::roadwise),
            hourly: notifier.or_demo(hourly, demo::hourly),
            trend: notifier.or_demo(trend, || demo::trend(now, &mut rng)),
            heatmap: notifier.or_demo(heatmap, demo::heatmap),
            alerts: notifier.or_demo(alerts, || demo::dashboard_alerts(now)),
        }
    });

    let content = match data.read().clone() {
        None => rsx! {
            div { class: "card p-6", aria_busy: "true", "Loading dashboard..." }
        },
        Some(d) => render(d),
    };

    rsx! {
        Layout {
            title: "Dashboard".to_string(),
            nav_active: "dashboard".to_string(),

            PageHeader {
                title: "Dashboard".to_string(),
                subtitle: "Real-time analytics command center".to_string(),
            }
            div { style: "display:flex;justify-content:flex-end;margin-bottom:1rem;",
                button { class: "outline", onclick: move |_| data.restart(), "\u{21BB} Refresh" }
            }
            {content}
        }
    }
}

fn render(d: DashboardData) -> Element {
    let counts = d.summary.today_counts;
    let peak = if d.summary.peak_hour.is_empty() {
        "\u{2014}".to_string()
    } else {
        d.summary.peak_hour.clone()
    };
    let busiest = d
        .roadwise
        .first()
        .map(|r| r.road_name.clone())
        .unwrap_or_else(|| "\u{2014}".to_string());

    let hourly_labels: Vec<String> = d.hourly.iter().map(HourlyPoint::label).collect();
    let hourly_values: Vec<f64> = d.hourly.iter().map(|p| p.avg_vehicles).collect();

    let top: Vec<&RoadUsage> = d.roadwise.iter().take(TOP_ROADS).collect();
    let road_labels: Vec<String> = top.iter().map(|r| r.road_name.clone()).collect();
    let road_values: Vec<f64> = top.iter().map(|r| r.avg_vehicles).collect();
    let road_colors: Vec<String> = top
        .iter()
        .map(|r| level_color(Some(r.congestion_level)).to_string())
        .collect();

    let trend_labels: Vec<String> = d.trend.iter().map(|t| format_day(t.date)).collect();
    let trend_values: Vec<f64> = d.trend.iter().map(|t| t.avg_vehicles).collect();

    let heat = heatmap_by_hour(&d.heatmap).to_vec();
    let alerts: Vec<Alert> = d.alerts.into_iter().take(ALERT_ROWS).collect();

    rsx! {
        div { class: "stat-grid",
            StatTile { label: "Total Roads".to_string(), value: d.summary.total_roads.to_string(), icon: "\u{25EB}".to_string() }
            StatTile { label: "Peak Hour".to_string(), value: peak, icon: "\u{25F7}".to_string(), color: "#f59e0b".to_string() }
            StatTile { label: "Critical Now".to_string(), value: d.summary.current_critical.to_string(), icon: "\u{25A0}".to_string(), color: "#ef4444".to_string() }
            StatTile { label: "Today's Entries".to_string(), value: counts.total().to_string(), icon: "\u{25C9}".to_string() }
            StatTile { label: "Low Traffic".to_string(), value: counts.low.to_string(), icon: "\u{25B2}".to_string(), color: "#22c55e".to_string() }
            StatTile { label: "Busiest Road".to_string(), value: busiest, icon: "\u{25CF}".to_string(), color: "#f97316".to_string() }
        }

        div { class: "chart-grid",
            article { class: "card p-6",
                h3 { "Hourly Traffic" }
                LineChart {
                    labels: hourly_labels,
                    series: vec![Series::new("Avg Vehicles", "#f59e0b", hourly_values)],
                    fill: true,
                }
            }
            article { class: "card p-6",
                h3 { "Today's Levels" }
                Doughnut { slices: level_slices(&counts) }
            }
            article { class: "card p-6",
                h3 { "Road-wise Load" }
                BarChart { labels: road_labels, values: road_values, colors: road_colors }
            }
            article { class: "card p-6",
                h3 { "Daily Trend" }
                LineChart {
                    labels: trend_labels,
                    series: vec![Series::new("Avg Vehicles", "#22d3ee", trend_values)],
                    fill: true,
                }
            }
        }

        article { class: "card p-6",
            h3 { "24h Heatmap" }
            Heatmap { values: heat }
        }

        article { class: "card p-6",
            h3 { "Active Alerts" }
            if alerts.is_empty() {
                EmptyState {
                    icon: "\u{26A0}".to_string(),
                    title: "No Active Alerts".to_string(),
                    message: "All roads are running smoothly".to_string(),
                }
            } else {
                for a in alerts {
                    div {
                        key: "{a.id}",
                        class: "alert-item mb-4",
                        style: if a.congestion_level == CongestionLevel::Critical { "border-color:#ef4444" } else { "border-color:#f97316" },
                        strong { "{a.road_name} " }
                        LevelBadge { level: Some(a.congestion_level) }
                        br {}
                        small { "{a.congestion_level} \u{00B7} {a.vehicle_count} vehicles \u{00B7} {a.weather}" }
                    }
                }
            }
        }
    }
}
