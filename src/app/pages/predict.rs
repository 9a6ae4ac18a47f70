//! Congestion prediction form with a 24-hour forecast chart.

use dioxus::prelude::*;
use flowguard_model::prediction::{demo_prediction, synthetic_hourly_curve};
use flowguard_model::{HourlyPoint, Prediction, PredictionQuery, Road, RoadStatus, Weather};
use rand::Rng;

use crate::app::api::fetch_json;
use crate::app::components::{BarChart, Layout, PageHeader};
use crate::app::demo;
use crate::app::format::{forecast_color, format_time, hour_labels, level_color};
use crate::app::notify::use_notifier;

/// Selected road and hour, validated.
fn parse_form(road: &str, hour: &str) -> Result<(u64, u32), &'static str> {
    let road_id = road
        .trim()
        .parse::<u64>()
        .map_err(|_| "Please select a road.")?;
    let hour = hour
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|h| *h < 24)
        .ok_or("Please select an hour.")?;
    Ok((road_id, hour))
}

/// Forecast bars: the road's own hourly profile, or the synthetic curve
/// when it has none.
fn forecast_values(hourly: &[HourlyPoint], weather: Weather) -> (Vec<String>, Vec<f64>) {
    if hourly.is_empty() {
        (hour_labels(), synthetic_hourly_curve(weather).to_vec())
    } else {
        (
            hourly.iter().map(HourlyPoint::label).collect(),
            hourly.iter().map(|p| p.avg_vehicles).collect(),
        )
    }
}

#[component]
pub fn Predict(road: String) -> Element {
    let mut notifier = use_notifier();

    let mut road_id = use_signal(|| road.clone());
    let mut hour = use_signal(String::new);
    let mut weather = use_signal(|| Weather::Clear);
    let mut holiday = use_signal(|| false);
    let mut result = use_signal(|| None::<Prediction>);
    let mut forecast = use_signal(|| None::<(Vec<String>, Vec<f64>)>);

    let roads = use_resource(move || async move {
        let mut notifier = notifier;
        notifier.or_demo(
            fetch_json::<Vec<RoadStatus>>("/roads")
                .await
                .map(|rows| rows.into_iter().map(|r| r.road).collect::<Vec<Road>>()),
            demo::roads,
        )
    });

    let run = move |evt: FormEvent| {
        evt.prevent_default();
        let (id, h) = match parse_form(&road_id(), &hour()) {
            Ok(v) => v,
            Err(msg) => {
                notifier.error(msg);
                return;
            }
        };
        let query = PredictionQuery {
            hour: h,
            weather: weather(),
            is_holiday: holiday(),
        };
        let road_name = roads
            .read()
            .as_ref()
            .and_then(|list| list.iter().find(|r| r.id == id).map(|r| r.road_name.clone()));

        spawn(async move {
            notifier.show_loading("Running ML prediction...");
            let path = format!("/predict/{}?{}", id, query.to_query());
            let prediction = match fetch_json::<Prediction>(&path).await {
                Ok(p) => p,
                Err(e) if !e.is_offline() => {
                    notifier.hide_loading();
                    notifier.error(e.user_message("Prediction failed."));
                    return;
                }
                Err(e) => {
                    tracing::warn!("Prediction failed, using demo heuristic: {}", e);
                    notifier.demo_mode();
                    let mut rng = rand::thread_rng();
                    let jitter = rng.gen_range(-5..=5);
                    let confidence = f64::from(rng.gen_range(60..=85));
                    demo_prediction(id, road_name.as_deref(), &query, jitter, confidence)
                }
            };
            notifier.hide_loading();
            let weather = prediction.weather;
            result.set(Some(prediction));

            let hourly = fetch_json::<Vec<HourlyPoint>>(&format!("/analytics/hourly?road_id={}", id))
                .await
                .unwrap_or_default();
            forecast.set(Some(forecast_values(&hourly, weather)));
        });
    };

    let road_list = roads.read().clone().unwrap_or_default();

    rsx! {
        Layout {
            title: "Predict".to_string(),
            nav_active: "predict".to_string(),

            PageHeader {
                title: "Traffic Prediction".to_string(),
                subtitle: "ML-powered congestion forecasting engine".to_string(),
            }

            div { class: "grid",
                article { class: "card p-6",
                    form { onsubmit: run,
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
                        label { "Hour"
                            select { value: "{hour}", onchange: move |e| hour.set(e.value()),
                                option { value: "", "Select an hour..." }
                                for h in 0..24u32 {
                                    option { key: "{h}", value: "{h}", "{format_time(Some(h))}" }
                                }
                            }
                        }
                        label { "Weather"
                            select { onchange: move |e| weather.set(Weather::from(e.value())),
                                for w in Weather::ALL {
                                    option { key: "{w}", value: "{w}", selected: weather() == w, "{w}" }
                                }
                            }
                        }
                        label {
                            input { r#type: "checkbox", checked: holiday(), onchange: move |_| holiday.toggle() }
                            " Public holiday"
                        }
                        button { r#type: "submit", "\u{25C8} Predict" }
                    }
                }

                if let Some(p) = result() {
                    {
                        let color = level_color(Some(p.predicted_level));
                        rsx! {
                            article { class: "card p-6", id: "predictResult",
                                div { style: "background:{color}15;padding:1rem;border-radius:8px;margin-bottom:1rem;",
                                    h2 { style: "color:{color};margin:0;", "{p.predicted_level.as_str().to_uppercase()}" }
                                    small { "Predicted for {p.road_name} at {p.hour}" }
                                }
                                div { class: "grid",
                                    div { small { "Confidence" } p { strong { "{p.confidence}%" } } }
                                    div { small { "Level" } p { strong { "{p.predicted_level}" } } }
                                    div { small { "Weather" } p { strong { "{p.weather}" } } }
                                    div { small { "Holiday" } p { strong { if p.is_holiday { "Yes" } else { "No" } } } }
                                }
                                p { "{p.suggestion}" }
                                if let Some(note) = &p.note {
                                    small { class: "text-muted", "({note})" }
                                }
                            }
                        }
                    }
                }
            }

            if let Some((labels, values)) = forecast() {
                {
                    let colors: Vec<String> = values.iter().map(|v| forecast_color(*v).to_string()).collect();
                    rsx! {
                        article { class: "card p-6",
                            h3 { "24-Hour Forecast" }
                            BarChart { labels, values, colors }
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
    fn test_parse_form() {
        assert_eq!(parse_form("", "9"), Err("Please select a road."));
        assert_eq!(parse_form("3", ""), Err("Please select an hour."));
        assert_eq!(parse_form("3", "24"), Err("Please select an hour."));
        assert_eq!(parse_form("3", "0"), Ok((3, 0)));
    }

    #[test]
    fn test_forecast_falls_back_to_curve() {
        let (labels, values) = forecast_values(&[], Weather::Rain);
        assert_eq!(labels.len(), 24);
        assert_eq!(values, synthetic_hourly_curve(Weather::Rain).to_vec());

        let own = vec![HourlyPoint::new(8, 640.0), HourlyPoint::new(9, 910.0)];
        let (labels, values) = forecast_values(&own, Weather::Clear);
        assert_eq!(labels, vec!["8:00", "9:00"]);
        assert_eq!(values, vec![640.0, 910.0]);
    }
}
