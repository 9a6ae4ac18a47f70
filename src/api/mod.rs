//! HTTP API handlers
//!
//! Every route forwards to the configured [`TrafficBackend`]. The router is
//! mounted under `/api` by the server so the UI's page paths stay free.

mod error;

pub use error::{ApiError, ApiJson, ApiResult};

use crate::backend::{BackendError, TrafficBackend};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Timelike;
use flowguard_model::{
    traffic::{csv_filename, history_csv},
    Alert, DashboardSummary, HeatmapCell, HistoryFilter, HistoryRow, HourlyPoint, LoginRequest,
    LoginResponse, MessageResponse, NewRoad, NewTrafficRecord, Prediction, PredictionQuery,
    ProfileUpdate, RegisterRequest, RoadComparison, RoadStatus, RoadUsage, TrafficAdded,
    TrendPoint, Weather,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TrafficBackend>,
    started: Instant,
}

impl AppState {
    pub fn new(backend: Arc<dyn TrafficBackend>) -> Self {
        Self {
            backend,
            started: Instant::now(),
        }
    }
}

/// All REST routes with state applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/login", post(login_handler))
        .route("/register", post(register_handler))
        .route("/profile/update", post(profile_update_handler))
        .route("/roads", get(roads_handler))
        .route("/road/add", post(add_road_handler))
        .route("/traffic/add", post(add_traffic_handler))
        .route("/traffic/history", get(history_handler))
        .route("/traffic/history/export", get(history_export_handler))
        .route("/predict/{road_id}", get(predict_handler))
        .route("/analytics/dashboard", get(dashboard_handler))
        .route("/analytics/roadwise", get(roadwise_handler))
        .route("/analytics/hourly", get(hourly_handler))
        .route("/analytics/trend", get(trend_handler))
        .route("/analytics/heatmap", get(heatmap_handler))
        .route("/analytics/alerts", get(alerts_handler))
        .route("/analytics/compare", get(compare_handler))
        .with_state(state)
}

/// General status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub backend: &'static str,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "flowguard",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        backend: state.backend.kind(),
    })
}

// =============================================================================
// Accounts
// =============================================================================

pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(Json(state.backend.login(req).await?))
}

pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<MessageResponse> {
    Ok(Json(state.backend.register(req).await?))
}

pub async fn profile_update_handler(
    State(state): State<AppState>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<MessageResponse> {
    Ok(Json(state.backend.update_profile(update).await?))
}

// =============================================================================
// Roads and readings
// =============================================================================

pub async fn roads_handler(State(state): State<AppState>) -> ApiResult<Vec<RoadStatus>> {
    Ok(Json(state.backend.roads().await?))
}

pub async fn add_road_handler(
    State(state): State<AppState>,
    ApiJson(road): ApiJson<NewRoad>,
) -> ApiResult<MessageResponse> {
    Ok(Json(state.backend.add_road(road).await?))
}

pub async fn add_traffic_handler(
    State(state): State<AppState>,
    ApiJson(record): ApiJson<NewTrafficRecord>,
) -> ApiResult<TrafficAdded> {
    Ok(Json(state.backend.add_traffic(record).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    road_id: Option<String>,
    date: Option<String>,
    level: Option<String>,
}

impl HistoryParams {
    fn filter(&self) -> Result<HistoryFilter, ApiError> {
        HistoryFilter::from_params(
            self.road_id.as_deref(),
            self.date.as_deref(),
            self.level.as_deref(),
        )
        .map_err(|msg| ApiError(BackendError::Invalid(msg)))
    }
}

pub async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<HistoryRow>> {
    let filter = params.filter()?;
    Ok(Json(state.backend.history(&filter).await?))
}

/// GET /traffic/history/export - filtered history as a CSV attachment
pub async fn history_export_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.filter()?;
    let rows = state.backend.history(&filter).await?;
    let filename = csv_filename(chrono::Local::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        history_csv(&rows),
    ))
}

// =============================================================================
// Prediction
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PredictParams {
    hour: Option<String>,
    weather: Option<String>,
    is_holiday: Option<String>,
}

impl PredictParams {
    /// Missing hour means the current local hour.
    fn query(&self, current_hour: u32) -> Result<PredictionQuery, ApiError> {
        let hour = match self.hour.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            Some(h) => h
                .parse::<u32>()
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| ApiError(BackendError::Invalid("Invalid hour!".to_string())))?,
            None => current_hour,
        };
        let weather = self
            .weather
            .as_deref()
            .map(Weather::from)
            .unwrap_or_default();
        let is_holiday = matches!(
            self.is_holiday.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("True")
        );
        Ok(PredictionQuery {
            hour,
            weather,
            is_holiday,
        })
    }
}

pub async fn predict_handler(
    State(state): State<AppState>,
    Path(road_id): Path<String>,
    Query(params): Query<PredictParams>,
) -> ApiResult<Prediction> {
    let road_id: u64 = road_id
        .parse()
        .map_err(|_| ApiError(BackendError::road_not_found()))?;
    let query = params.query(chrono::Local::now().hour())?;
    Ok(Json(state.backend.predict(road_id, query).await?))
}

// =============================================================================
// Analytics
// =============================================================================

pub async fn dashboard_handler(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    Ok(Json(state.backend.dashboard().await?))
}

pub async fn roadwise_handler(State(state): State<AppState>) -> ApiResult<Vec<RoadUsage>> {
    Ok(Json(state.backend.roadwise().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct HourlyParams {
    road_id: Option<String>,
}

pub async fn hourly_handler(
    State(state): State<AppState>,
    Query(params): Query<HourlyParams>,
) -> ApiResult<Vec<HourlyPoint>> {
    let road_id = match params.road_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            ApiError(BackendError::Invalid(format!("Invalid road_id: {}", raw)))
        })?),
        None => None,
    };
    Ok(Json(state.backend.hourly(road_id).await?))
}

pub async fn trend_handler(State(state): State<AppState>) -> ApiResult<Vec<TrendPoint>> {
    Ok(Json(state.backend.trend().await?))
}

pub async fn heatmap_handler(State(state): State<AppState>) -> ApiResult<Vec<HeatmapCell>> {
    Ok(Json(state.backend.heatmap().await?))
}

pub async fn alerts_handler(State(state): State<AppState>) -> ApiResult<Vec<Alert>> {
    Ok(Json(state.backend.alerts().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareParams {
    road1: Option<String>,
    road2: Option<String>,
}

pub async fn compare_handler(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> ApiResult<RoadComparison> {
    let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<u64>().ok());
    let (Some(road1), Some(road2)) = (parse(&params.road1), parse(&params.road2)) else {
        return Err(ApiError(BackendError::Invalid(
            "Provide road1 and road2!".to_string(),
        )));
    };
    Ok(Json(state.backend.compare(road1, road2).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EmbeddedBackend;
    use crate::store::Store;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDateTime;
    use flowguard_model::timestamp;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn fixed_now() -> NaiveDateTime {
        timestamp::parse("2024-01-15 12:30:00").unwrap()
    }

    async fn app() -> Router {
        let store = Arc::new(Store::in_memory());
        store.seed_demo(fixed_now()).await;
        let backend = EmbeddedBackend::with_clock(store, fixed_now);
        router(AppState::new(Arc::new(backend)))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status() {
        let (status, body) = get_json(app().await, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "flowguard");
        assert_eq!(body["backend"], "embedded");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = app().await;
        let (status, body) = post_json(
            app.clone(),
            "/register",
            r#"{"name":"Asha","email":"asha@city.gov","password":"pw"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Registered successfully!");

        let (status, body) = post_json(
            app.clone(),
            "/login",
            r#"{"email":"asha@city.gov","password":"wrong"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid password!"}));

        let (status, body) = post_json(
            app,
            "/login",
            r#"{"email":"asha@city.gov","password":"pw"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Asha");
        assert_eq!(body["role"], "admin");
    }

    #[tokio::test]
    async fn test_bad_body_is_missing_fields() {
        let (status, body) = post_json(app().await, "/login", r#"{"email":"x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing fields!");

        let (status, _) = post_json(app().await, "/road/add", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_traffic_unknown_road() {
        let (status, body) = post_json(
            app().await,
            "/traffic/add",
            r#"{"road_id":99,"vehicle_count":10}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Road not found!");
    }

    #[tokio::test]
    async fn test_add_traffic_returns_level() {
        let (status, body) = post_json(
            app().await,
            "/traffic/add",
            r#"{"road_id":1,"vehicle_count":1150,"weather":"Rain","is_holiday":1,"recorded_at":"2024-01-15 12:00:00"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["congestion_level"], "Critical");
        assert!(body["suggestion"].as_str().unwrap().contains("Emergency"));
    }

    #[tokio::test]
    async fn test_history_filters() {
        let (status, body) =
            get_json(app().await, "/traffic/history?road_id=2&date=2024-01-15&level=").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 13);
        assert!(rows.iter().all(|r| r["road_name"] == "Ring Road"));

        let (status, body) = get_json(app().await, "/traffic/history?road_id=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid road_id: abc");
    }

    #[tokio::test]
    async fn test_history_export_is_csv() {
        let req = Request::get("/traffic/history/export?road_id=3")
            .body(Body::empty())
            .unwrap();
        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/csv"));
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("traffic_history_"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Road,Date/Time,Vehicles,Level,Weather,Holiday,Area")
        );
        assert!(lines.all(|l| l.starts_with("NH-44,")));
    }

    #[tokio::test]
    async fn test_predict() {
        let (status, body) =
            get_json(app().await, "/predict/1?hour=9&weather=Rain&is_holiday=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["road_name"], "MG Road");
        assert_eq!(body["hour"], "9:00");
        assert_eq!(body["weather"], "Rain");
        assert_eq!(body["is_holiday"], false);

        let (status, body) = get_json(app().await, "/predict/1?hour=24").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid hour!");

        let (status, _) = get_json(app().await, "/predict/42?hour=9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analytics_routes() {
        let (_, dash) = get_json(app().await, "/analytics/dashboard").await;
        assert_eq!(dash["total_roads"], 5);

        let (_, hourly) = get_json(app().await, "/analytics/hourly?road_id=1").await;
        assert_eq!(hourly.as_array().unwrap().len(), 24);
        assert_eq!(hourly[0]["hour_label"], "0:00");

        let (_, alerts) = get_json(app().await, "/analytics/alerts").await;
        assert!(alerts.is_array());

        let (status, cmp) = get_json(app().await, "/analytics/compare?road1=1&road2=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cmp["road1"]["road"]["road_name"], "MG Road");

        let (status, body) = get_json(app().await, "/analytics/compare?road1=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Provide road1 and road2!");
    }
}
