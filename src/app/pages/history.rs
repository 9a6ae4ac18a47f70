//! Traffic history browser with filters, pagination and CSV export.

use dioxus::prelude::*;
use flowguard_model::traffic::{csv_filename, daily_averages, history_csv};
use flowguard_model::{CongestionLevel, HistoryFilter, HistoryRow, HistoryStats, Road, RoadStatus};

use crate::app::api::fetch_json;
use crate::app::components::{Layout, LevelBadge, LineChart, PageHeader, Series, StatTile};
use crate::app::demo;
use crate::app::format::{format_date_time, format_day};
use crate::app::notify::use_notifier;
use crate::app::timer::local_now;

pub const PAGE_SIZE: usize = 10;

/// Number of pages for `total` rows (at least one).
fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE).max(1)
}

fn page_slice(rows: &[HistoryRow], page: usize) -> &[HistoryRow] {
    let start = (page * PAGE_SIZE).min(rows.len());
    let end = (start + PAGE_SIZE).min(rows.len());
    &rows[start..end]
}

/// `data:` URI carrying the CSV, usable as a download link.
fn csv_href(rows: &[HistoryRow]) -> String {
    format!(
        "data:text/csv;charset=utf-8,{}",
        urlencoding::encode(&history_csv(rows))
    )
}

#[component]
pub fn History() -> Element {
    let mut notifier = use_notifier();

    let mut road = use_signal(String::new);
    let mut date = use_signal(String::new);
    let mut level = use_signal(String::new);
    let mut applied = use_signal(HistoryFilter::default);
    let mut page = use_signal(|| 0usize);

    let roads = use_resource(move || async move {
        fetch_json::<Vec<RoadStatus>>("/roads")
            .await
            .map(|rows| rows.into_iter().map(|r| r.road).collect::<Vec<Road>>())
            .unwrap_or_else(|_| demo::roads())
    });

    let rows = use_resource(move || {
        let filter = applied();
        async move {
            let mut notifier = notifier;
            let query = filter.to_query();
            let path = if query.is_empty() {
                "/traffic/history".to_string()
            } else {
                format!("/traffic/history?{}", query)
            };
            notifier.or_demo(fetch_json::<Vec<HistoryRow>>(&path).await, || {
                demo::history(local_now(), &mut rand::thread_rng())
            })
        }
    });

    let apply = move |_| {
        match HistoryFilter::from_params(
            Some(road().as_str()),
            Some(date().as_str()),
            Some(level().as_str()),
        ) {
            Ok(filter) => {
                page.set(0);
                applied.set(filter);
            }
            Err(e) => notifier.error(e),
        }
    };

    let road_list = roads.read().clone().unwrap_or_default();
    let data = rows.read().clone();

    let body = match data {
        None => rsx! {
            div { class: "card p-6", aria_busy: "true", "Fetching history..." }
        },
        Some(data) => {
            let stats = HistoryStats::from_rows(&data);
            let daily = daily_averages(&data);
            let trend_labels: Vec<String> = daily.iter().map(|(d, _)| format_day(*d)).collect();
            let trend_values: Vec<f64> = daily.iter().map(|(_, v)| *v).collect();
            let pages = page_count(data.len());
            let current = page().min(pages - 1);
            let visible = page_slice(&data, current).to_vec();
            let filename = csv_filename(local_now().date());
            let href = csv_href(&data);
            let empty = data.is_empty();

            rsx! {
                div { class: "stat-grid",
                    StatTile { label: "Total Records".to_string(), value: stats.total.to_string(), icon: "\u{25F7}".to_string() }
                    StatTile { label: "Critical".to_string(), value: stats.critical.to_string(), icon: "\u{25A0}".to_string(), color: "#ef4444".to_string() }
                    StatTile { label: "Avg Vehicles".to_string(), value: stats.avg_vehicles.to_string(), icon: "\u{25C9}".to_string() }
                    StatTile { label: "High + Critical".to_string(), value: stats.high_or_worse.to_string(), icon: "\u{25CF}".to_string(), color: "#f97316".to_string() }
                }

                article { class: "card p-6",
                    div { style: "display:flex;justify-content:space-between;align-items:center;",
                        h3 { "Records" }
                        if empty {
                            button { class: "outline", onclick: move |_| notifier.warning("No data to export."), "\u{2B07} Export CSV" }
                        } else {
                            a {
                                role: "button",
                                class: "outline",
                                href: "{href}",
                                download: "{filename}",
                                onclick: move |_| notifier.success("CSV exported successfully!"),
                                "\u{2B07} Export CSV"
                            }
                        }
                    }
                    div { class: "overflow-auto",
                        table {
                            thead {
                                tr {
                                    th { "Road" }
                                    th { "Date/Time" }
                                    th { "Vehicles" }
                                    th { "Level" }
                                    th { "Weather" }
                                    th { "Holiday" }
                                    th { "Area" }
                                }
                            }
                            tbody {
                                if empty {
                                    tr {
                                        td { colspan: "7", style: "text-align:center;padding:40px;", class: "text-muted", "No records found" }
                                    }
                                }
                                for r in visible {
                                    tr { key: "{r.record.id}",
                                        td { "{r.display_road()}" }
                                        td { "{format_date_time(Some(r.record.recorded_at))}" }
                                        td { "{r.record.vehicle_count}" }
                                        td { LevelBadge { level: Some(r.record.congestion_level) } }
                                        td { "{r.record.weather}" }
                                        td { if r.record.is_holiday { "Yes" } else { "No" } }
                                        td { "{r.area}" }
                                    }
                                }
                            }
                        }
                    }
                    div { class: "pager",
                        button { class: "outline", disabled: current == 0, onclick: move |_| page.set(current.saturating_sub(1)), "\u{2190}" }
                        small { "Page {current + 1} of {pages}" }
                        button { class: "outline", disabled: current + 1 >= pages, onclick: move |_| page.set(current + 1), "\u{2192}" }
                    }
                }

                article { class: "card p-6",
                    h3 { "Daily Average" }
                    LineChart {
                        labels: trend_labels,
                        series: vec![Series::new("Avg Vehicles", "#22d3ee", trend_values)],
                        fill: true,
                    }
                }
            }
        }
    };

    rsx! {
        Layout {
            title: "History".to_string(),
            nav_active: "history".to_string(),

            PageHeader {
                title: "Traffic History".to_string(),
                subtitle: "Browse and analyze historical traffic records".to_string(),
            }

            article { class: "card p-6",
                div { class: "grid",
                    label { "Road"
                        select { value: "{road}", onchange: move |e| road.set(e.value()),
                            option { value: "", "All Roads" }
                            for r in road_list {
                                option { key: "{r.id}", value: "{r.id}", "{r.road_name}" }
                            }
                        }
                    }
                    label { "Date"
                        input { r#type: "date", value: "{date}", oninput: move |e| date.set(e.value()) }
                    }
                    label { "Level"
                        select { value: "{level}", onchange: move |e| level.set(e.value()),
                            option { value: "", "All Levels" }
                            for l in CongestionLevel::ALL {
                                option { key: "{l}", value: "{l}", "{l}" }
                            }
                        }
                    }
                }
                button { onclick: apply, "\u{2315} Apply Filters" }
            }

            {body}
        }
    }
}
