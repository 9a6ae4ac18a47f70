//! Small presentational pieces shared by the pages.

use dioxus::prelude::*;
use flowguard_model::CongestionLevel;

use crate::app::format::{clock_text, format_time, heat_color, level_bg, level_color, level_icon};
use crate::app::timer::use_clock;

/// Coloured congestion badge; `None` renders a neutral "No Data" badge.
#[component]
pub fn LevelBadge(level: Option<CongestionLevel>) -> Element {
    let color = level_color(level);
    let bg = level_bg(level);
    let icon = level_icon(level);
    let text = level.map(|l| l.as_str()).unwrap_or("No Data");

    rsx! {
        span {
            class: "badge",
            style: "background:{bg};color:{color};border:1px solid {color}30",
            "{icon} {text}"
        }
    }
}

#[component]
pub fn StatTile(
    label: String,
    value: String,
    #[props(default = "\u{25C6}".to_string())] icon: String,
    #[props(default = "var(--pico-primary)".to_string())] color: String,
) -> Element {
    rsx! {
        div { class: "card stat-tile",
            span { class: "stat-icon", style: "color:{color}", "{icon}" }
            div {
                div { class: "stat-value", "{value}" }
                small { class: "stat-label", "{label}" }
            }
        }
    }
}

#[component]
pub fn EmptyState(icon: String, title: String, message: String) -> Element {
    rsx! {
        div { class: "empty-state",
            span { class: "empty-icon", "{icon}" }
            h3 { "{title}" }
            p { "{message}" }
        }
    }
}

/// Page title, subtitle and the live clock.
#[component]
pub fn PageHeader(title: String, subtitle: String) -> Element {
    let clock = use_clock();
    let time = clock().map(clock_text).unwrap_or_default();

    rsx! {
        div { class: "page-header",
            div {
                h1 { class: "text-2xl font-bold", "{title}" }
                p { class: "text-muted text-sm", "{subtitle}" }
            }
            span { class: "page-clock", "{time}" }
        }
    }
}

/// 24 cells, one per hour, shaded by load relative to the busiest hour.
#[component]
pub fn Heatmap(values: Vec<f64>) -> Element {
    let max = values.iter().copied().fold(0.0_f64, f64::max);

    rsx! {
        div { class: "heatmap",
            for (hour, v) in values.iter().copied().enumerate() {
                {
                    let ratio = if max > 0.0 { v / max } else { 0.0 };
                    let bg = heat_color(ratio);
                    let title = format!("{} \u{2014} {} vehicles", format_time(Some(hour as u32)), v.round());
                    rsx! {
                        div { key: "{hour}", class: "heat-cell", style: "background:{bg}", title: "{title}",
                            span { class: "heat-hour", "{hour}" }
                        }
                    }
                }
            }
        }
    }
}
