//! Display helpers: dates, hours, and the congestion colour palette.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use flowguard_model::CongestionLevel;

pub const PLACEHOLDER: &str = "\u{2014}";

/// `15 Jan 2024`
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// `15 Jan`
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d %b").to_string()
}

/// 12-hour clock label for an hour of the day: `0 -> "12:00 AM"`, `17 -> "5:00 PM"`.
pub fn format_time(hour: Option<u32>) -> String {
    match hour {
        Some(h) => {
            let h = h % 24;
            let twelve = if h % 12 == 0 { 12 } else { h % 12 };
            format!("{}:00 {}", twelve, if h >= 12 { "PM" } else { "AM" })
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// `15 Jan, 09:05 AM`
pub fn format_date_time(at: Option<NaiveDateTime>) -> String {
    match at {
        Some(t) => {
            let (pm, hour) = t.hour12();
            format!(
                "{}, {:02}:{:02} {}",
                format_day(t.date()),
                hour,
                t.minute(),
                if pm { "PM" } else { "AM" }
            )
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// Clock text shown in page headers (24-hour).
pub fn clock_text(now: NaiveDateTime) -> String {
    now.format("%H:%M:%S").to_string()
}

pub fn level_color(level: Option<CongestionLevel>) -> &'static str {
    match level {
        Some(CongestionLevel::Low) => "#22c55e",
        Some(CongestionLevel::Medium) => "#f59e0b",
        Some(CongestionLevel::High) => "#f97316",
        Some(CongestionLevel::Critical) => "#ef4444",
        None => "#94a3b8",
    }
}

/// Translucent badge background for a level.
pub fn level_bg(level: Option<CongestionLevel>) -> &'static str {
    match level {
        Some(CongestionLevel::Low) => "rgba(34,197,94,0.15)",
        Some(CongestionLevel::Medium) => "rgba(245,158,11,0.15)",
        Some(CongestionLevel::High) => "rgba(249,115,22,0.15)",
        Some(CongestionLevel::Critical) => "rgba(239,68,68,0.15)",
        None => "rgba(148,163,184,0.15)",
    }
}

pub fn level_icon(level: Option<CongestionLevel>) -> &'static str {
    match level {
        Some(CongestionLevel::Low) => "\u{25B2}",
        Some(CongestionLevel::Medium) | None => "\u{25C6}",
        Some(CongestionLevel::High) => "\u{25CF}",
        Some(CongestionLevel::Critical) => "\u{25A0}",
    }
}

/// Heatmap cell colour for a load ratio in `0..=1`.
pub fn heat_color(ratio: f64) -> String {
    let r = ratio.clamp(0.0, 1.0);
    if r < 0.3 {
        format!("rgba(34,197,94,{:.2})", 0.3 + r)
    } else if r < 0.6 {
        format!("rgba(245,158,11,{:.2})", 0.3 + r)
    } else if r < 0.8 {
        format!("rgba(249,115,22,{:.2})", 0.4 + r * 0.5)
    } else {
        format!("rgba(239,68,68,{:.2})", 0.5 + r * 0.4)
    }
}

/// Bar colour in the 24-hour forecast chart.
pub fn forecast_color(vehicles: f64) -> &'static str {
    if vehicles > 900.0 {
        "rgba(239,68,68,0.6)"
    } else if vehicles > 600.0 {
        "rgba(249,115,22,0.6)"
    } else if vehicles > 350.0 {
        "rgba(245,158,11,0.6)"
    } else {
        "rgba(34,197,94,0.6)"
    }
}

/// Chart point labels `"0:00" .. "23:00"`.
pub fn hour_labels() -> Vec<String> {
    (0..24).map(|h| format!("{}:00", h)).collect()
}
