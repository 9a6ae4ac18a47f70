//! Small SVG charts: line, bar, grouped bar and doughnut.
//!
//! Geometry is computed by plain functions so it can be tested without a
//! renderer; the components only lay the results out.

use dioxus::prelude::*;
use flowguard_model::{CongestionLevel, LevelCounts};

use crate::app::format::level_color;

const WIDTH: f64 = 600.0;
const PAD_LEFT: f64 = 44.0;
const PAD_RIGHT: f64 = 8.0;
const PAD_TOP: f64 = 10.0;
const PAD_BOTTOM: f64 = 26.0;
const GRID_LINES: usize = 4;
const AXIS_COLOR: &str = "#94a3b8";
const GRID_COLOR: &str = "rgba(148,163,184,0.12)";

/// One named line or bar group.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, color: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            values,
        }
    }
}

/// One slice of a doughnut.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub color: String,
    pub value: f64,
}

impl Slice {
    pub fn new(label: impl Into<String>, color: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            value,
        }
    }
}

/// One slice per congestion level, in level order.
pub fn level_slices(counts: &LevelCounts) -> Vec<Slice> {
    CongestionLevel::ALL
        .iter()
        .map(|l| Slice::new(l.as_str(), level_color(Some(*l)), f64::from(counts.get(*l))))
        .collect()
}

/// Round the axis maximum up to a 1/2/5 × 10ⁿ step; never below 1.
pub fn nice_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max <= 1.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    for step in [1.0, 2.0, 5.0, 10.0] {
        if max <= step * magnitude {
            return step * magnitude;
        }
    }
    10.0 * magnitude
}

/// Plot area `(x0, y0, w, h)` inside a chart of the given height.
fn plot_area(height: f64) -> (f64, f64, f64, f64) {
    (
        PAD_LEFT,
        PAD_TOP,
        WIDTH - PAD_LEFT - PAD_RIGHT,
        height - PAD_TOP - PAD_BOTTOM,
    )
}

/// Center x of slot `i` out of `n` equal slots.
fn slot_x(i: usize, n: usize, height: f64) -> f64 {
    let (x0, _, w, _) = plot_area(height);
    let n = n.max(1) as f64;
    x0 + w * (i as f64 + 0.5) / n
}

fn value_y(value: f64, max: f64, height: f64) -> f64 {
    let (_, y0, _, h) = plot_area(height);
    y0 + h - h * (value / max).clamp(0.0, 1.0)
}

/// Plot coordinates of each value, left to right.
pub fn line_coords(values: &[f64], max: f64, height: f64) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (slot_x(i, values.len(), height), value_y(*v, max, height)))
        .collect()
}

fn points_attr(coords: &[(f64, f64)]) -> String {
    coords
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// SVG `points` attribute for a polyline through `values`.
pub fn line_points(values: &[f64], max: f64, height: f64) -> String {
    points_attr(&line_coords(values, max, height))
}

/// Closed polygon under a line, for the filled area.
pub fn area_points(values: &[f64], max: f64, height: f64) -> String {
    if values.is_empty() {
        return String::new();
    }
    let (_, y0, _, h) = plot_area(height);
    let base = y0 + h;
    format!(
        "{:.1},{:.1} {} {:.1},{:.1}",
        slot_x(0, values.len(), height),
        base,
        line_points(values, max, height),
        slot_x(values.len() - 1, values.len(), height),
        base
    )
}

/// `(x, y, width, height)` of each bar; `groups` bars share every slot.
pub fn bar_rects(
    values: &[f64],
    group: usize,
    groups: usize,
    max: f64,
    height: f64,
) -> Vec<(f64, f64, f64, f64)> {
    let (x0, y0, w, h) = plot_area(height);
    let n = values.len().max(1) as f64;
    let slot = w / n;
    let groups = groups.max(1) as f64;
    let bar = slot * 0.7 / groups;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let top = value_y(*v, max, height);
            let x = x0 + slot * i as f64 + slot * 0.15 + bar * group as f64;
            (x, top, bar, (y0 + h - top).max(0.0))
        })
        .collect()
}

/// Show at most ~12 x-axis labels.
fn label_step(n: usize) -> usize {
    n.div_ceil(12).max(1)
}

/// `(stroke-dasharray, stroke-dashoffset)` for each slice on a circle of
/// circumference 100; empty slices get zero length.
pub fn doughnut_dashes(values: &[f64]) -> Vec<(String, f64)> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut start = 0.0;
    values
        .iter()
        .map(|v| {
            let len = if total > 0.0 {
                v.max(0.0) / total * 100.0
            } else {
                0.0
            };
            let dash = (format!("{:.2} {:.2}", len, 100.0 - len), 25.0 - start);
            start += len;
            dash
        })
        .collect()
}

fn format_tick(v: f64) -> String {
    if v >= 1000.0 && v % 1000.0 == 0.0 {
        format!("{}k", v / 1000.0)
    } else {
        format!("{}", v.round())
    }
}

#[derive(Props, Clone, PartialEq)]
struct AxesProps {
    labels: Vec<String>,
    max: f64,
    height: f64,
}

#[component]
fn Axes(props: AxesProps) -> Element {
    let (x0, _, w, _) = plot_area(props.height);
    let step = label_step(props.labels.len());
    let label_y = props.height - 8.0;
    let n = props.labels.len();
    let height = props.height;

    rsx! {
        for g in 0..=GRID_LINES {
            {
                let value = props.max * g as f64 / GRID_LINES as f64;
                let y = value_y(value, props.max, height);
                rsx! {
                    g { key: "g{g}",
                        line { x1: "{x0}", x2: "{x0 + w}", y1: "{y}", y2: "{y}", stroke: GRID_COLOR }
                        text { x: "{x0 - 6.0}", y: "{y + 4.0}", fill: AXIS_COLOR, font_size: "10", text_anchor: "end",
                            "{format_tick(value)}"
                        }
                    }
                }
            }
        }
        for (i, label) in props.labels.iter().enumerate().filter(|(i, _)| i % step == 0) {
            text {
                key: "l{i}",
                x: "{slot_x(i, n, height)}",
                y: "{label_y}",
                fill: AXIS_COLOR,
                font_size: "10",
                text_anchor: "middle",
                "{label}"
            }
        }
    }
}

#[component]
fn Legend(items: Vec<(String, String)>) -> Element {
    rsx! {
        div { class: "chart-legend",
            for (label, color) in items {
                span { key: "{label}", class: "legend-item",
                    span { class: "legend-swatch", style: "background:{color}" }
                    "{label}"
                }
            }
        }
    }
}

/// Line chart with one or more series sharing the x labels.
#[component]
pub fn LineChart(
    labels: Vec<String>,
    series: Vec<Series>,
    #[props(default = 240.0)] height: f64,
    #[props(default = false)] fill: bool,
) -> Element {
    let max = nice_max(series.iter().flat_map(|s| s.values.iter().copied()));
    let legend: Vec<(String, String)> = series
        .iter()
        .filter(|s| !s.label.is_empty())
        .map(|s| (s.label.clone(), s.color.clone()))
        .collect();

    rsx! {
        div { class: "chart",
            svg { view_box: "0 0 {WIDTH} {height}", width: "100%", preserve_aspect_ratio: "none",
                Axes { labels: labels.clone(), max, height }
                for (i, s) in series.iter().enumerate() {
                    g { key: "s{i}",
                        if fill {
                            polygon {
                                points: area_points(&s.values, max, height),
                                fill: "{s.color}",
                                fill_opacity: "0.12",
                            }
                        }
                        polyline {
                            points: line_points(&s.values, max, height),
                            fill: "none",
                            stroke: "{s.color}",
                            stroke_width: "2",
                        }
                    }
                }
            }
            if legend.len() > 1 {
                Legend { items: legend }
            }
        }
    }
}

/// Single-series bar chart with a colour per bar.
#[component]
pub fn BarChart(
    labels: Vec<String>,
    values: Vec<f64>,
    colors: Vec<String>,
    #[props(default = 240.0)] height: f64,
) -> Element {
    let max = nice_max(values.iter().copied());
    let rects = bar_rects(&values, 0, 1, max, height);

    rsx! {
        div { class: "chart",
            svg { view_box: "0 0 {WIDTH} {height}", width: "100%", preserve_aspect_ratio: "none",
                Axes { labels, max, height }
                for (i, (x, y, w, h)) in rects.into_iter().enumerate() {
                    rect {
                        key: "{i}",
                        x: "{x}",
                        y: "{y}",
                        width: "{w}",
                        height: "{h}",
                        rx: "3",
                        fill: colors.get(i).cloned().unwrap_or_else(|| AXIS_COLOR.to_string()),
                    }
                }
            }
        }
    }
}

/// Bars from several series side by side in each slot.
#[component]
pub fn GroupedBarChart(
    labels: Vec<String>,
    series: Vec<Series>,
    #[props(default = 240.0)] height: f64,
) -> Element {
    let max = nice_max(series.iter().flat_map(|s| s.values.iter().copied()));
    let groups = series.len();
    let legend: Vec<(String, String)> = series
        .iter()
        .map(|s| (s.label.clone(), s.color.clone()))
        .collect();

    rsx! {
        div { class: "chart",
            svg { view_box: "0 0 {WIDTH} {height}", width: "100%", preserve_aspect_ratio: "none",
                Axes { labels, max, height }
                for (g, s) in series.iter().enumerate() {
                    for (i, (x, y, w, h)) in bar_rects(&s.values, g, groups, max, height).into_iter().enumerate() {
                        rect {
                            key: "{g}-{i}",
                            x: "{x}",
                            y: "{y}",
                            width: "{w}",
                            height: "{h}",
                            rx: "3",
                            fill: "{s.color}",
                        }
                    }
                }
            }
            Legend { items: legend }
        }
    }
}

/// Doughnut chart with a legend showing each slice's value.
#[component]
pub fn Doughnut(slices: Vec<Slice>) -> Element {
    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let dashes = doughnut_dashes(&values);
    let total: f64 = values.iter().sum();

    rsx! {
        div { class: "chart doughnut",
            svg { view_box: "0 0 42 42", width: "180", height: "180",
                circle { cx: "21", cy: "21", r: "15.915", fill: "none", stroke: GRID_COLOR, stroke_width: "6" }
                for (i, (slice, (dash, offset))) in slices.iter().zip(dashes).enumerate() {
                    circle {
                        key: "{i}",
                        cx: "21",
                        cy: "21",
                        r: "15.915",
                        fill: "none",
                        stroke: "{slice.color}",
                        stroke_width: "6",
                        stroke_dasharray: "{dash}",
                        stroke_dashoffset: "{offset}",
                    }
                }
                text { x: "21", y: "23", text_anchor: "middle", font_size: "6", fill: "currentColor", "{total}" }
            }
            Legend {
                items: slices.iter().map(|s| (format!("{} ({})", s.label, s.value), s.color.clone())).collect::<Vec<_>>()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_max() {
        assert_eq!(nice_max([]), 1.0);
        assert_eq!(nice_max([0.4]), 1.0);
        assert_eq!(nice_max([7.0]), 10.0);
        assert_eq!(nice_max([120.0, 80.0]), 200.0);
        assert_eq!(nice_max([920.0]), 1000.0);
        assert_eq!(nice_max([1100.0]), 2000.0);
        assert_eq!(nice_max([3000.0]), 5000.0);
    }

    #[test]
    fn test_line_points_span_plot() {
        let coords = line_coords(&[0.0, 100.0], 100.0, 226.0);
        assert_eq!(coords.len(), 2);
        // zero sits on the baseline, the max on the top edge
        assert_eq!(coords[0].1, 200.0);
        assert_eq!(coords[1].1, PAD_TOP);
        assert!(coords[0].0 < coords[1].0);

        assert_eq!(points_attr(&[(44.0, 200.0), (310.5, 10.0)]), "44.0,200.0 310.5,10.0");
    }

    #[test]
    fn test_area_points_closed() {
        assert_eq!(area_points(&[], 1.0, 240.0), "");
        let pts = area_points(&[5.0, 5.0, 5.0], 10.0, 240.0);
        assert_eq!(pts.split(' ').count(), 5);
    }

    #[test]
    fn test_grouped_bars_do_not_overlap() {
        let a = bar_rects(&[10.0, 20.0], 0, 2, 20.0, 240.0);
        let b = bar_rects(&[10.0, 20.0], 1, 2, 20.0, 240.0);
        for (ra, rb) in a.iter().zip(&b) {
            assert!(ra.0 + ra.2 <= rb.0 + 1e-9);
        }
        // full-height bar reaches the top of the plot
        assert!((a[1].1 - PAD_TOP).abs() < 1e-9);
    }

    #[test]
    fn test_doughnut_dashes() {
        let dashes = doughnut_dashes(&[1.0, 3.0, 0.0]);
        assert_eq!(dashes[0], ("25.00 75.00".to_string(), 25.0));
        assert_eq!(dashes[1], ("75.00 25.00".to_string(), 0.0));
        assert_eq!(dashes[2].0, "0.00 100.00");
        assert!(doughnut_dashes(&[0.0, 0.0]).iter().all(|(d, _)| d == "0.00 100.00"));
    }

    #[test]
    fn test_level_slices() {
        let counts = LevelCounts {
            low: 18,
            medium: 12,
            high: 6,
            critical: 3,
        };
        let slices = level_slices(&counts);
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0].label, "Low");
        assert_eq!(slices[3].value, 3.0);
        assert_eq!(slices[3].color, "#ef4444");
    }

    #[test]
    fn test_label_step() {
        assert_eq!(label_step(0), 1);
        assert_eq!(label_step(8), 1);
        assert_eq!(label_step(24), 2);
        assert_eq!(label_step(30), 3);
    }
}
