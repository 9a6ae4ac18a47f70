//! Backend forwarding every call to an external FlowGuard-compatible service.

use async_trait::async_trait;
use axum::http::StatusCode;
use flowguard_model::{
    Alert, DashboardSummary, ErrorBody, HeatmapCell, HistoryFilter, HistoryRow, HourlyPoint,
    LoginRequest, LoginResponse, MessageResponse, NewRoad, NewTrafficRecord, Prediction,
    PredictionQuery, ProfileUpdate, RegisterRequest, RoadComparison, RoadStatus, RoadUsage,
    TrafficAdded, TrendPoint,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{BackendError, BackendResult, TrafficBackend};

pub struct RemoteBackend {
    client: Client,
    base: Url,
}

impl RemoteBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> BackendResult<Url> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Internal(format!("Bad upstream path {}: {}", path, e)))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
        let status = response.status();
        if !status.is_success() {
            let code =
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Upstream error")
                    .to_string(),
            };
            debug!(%status, %message, "Upstream error");
            return Err(BackendError::from_status(code, message));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Internal(format!("Malformed upstream response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.url(path)?;
        debug!(%url, "GET upstream");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<T> {
        let url = self.url(path)?;
        debug!(%url, "POST upstream");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Self::decode(response).await
    }
}

fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

#[async_trait]
impl TrafficBackend for RemoteBackend {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn login(&self, req: LoginRequest) -> BackendResult<LoginResponse> {
        self.post_json("login", &req).await
    }

    async fn register(&self, req: RegisterRequest) -> BackendResult<MessageResponse> {
        self.post_json("register", &req).await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> BackendResult<MessageResponse> {
        self.post_json("profile/update", &update).await
    }

    async fn roads(&self) -> BackendResult<Vec<RoadStatus>> {
        self.get_json("roads").await
    }

    async fn add_road(&self, road: NewRoad) -> BackendResult<MessageResponse> {
        self.post_json("road/add", &road).await
    }

    async fn add_traffic(&self, record: NewTrafficRecord) -> BackendResult<TrafficAdded> {
        self.post_json("traffic/add", &record).await
    }

    async fn history(&self, filter: &HistoryFilter) -> BackendResult<Vec<HistoryRow>> {
        self.get_json(&with_query("traffic/history", &filter.to_query()))
            .await
    }

    async fn predict(&self, road_id: u64, query: PredictionQuery) -> BackendResult<Prediction> {
        self.get_json(&format!("predict/{}?{}", road_id, query.to_query()))
            .await
    }

    async fn dashboard(&self) -> BackendResult<DashboardSummary> {
        self.get_json("analytics/dashboard").await
    }

    async fn roadwise(&self) -> BackendResult<Vec<RoadUsage>> {
        self.get_json("analytics/roadwise").await
    }

    async fn hourly(&self, road_id: Option<u64>) -> BackendResult<Vec<HourlyPoint>> {
        let query = road_id.map(|id| format!("road_id={}", id)).unwrap_or_default();
        self.get_json(&with_query("analytics/hourly", &query)).await
    }

    async fn trend(&self) -> BackendResult<Vec<TrendPoint>> {
        self.get_json("analytics/trend").await
    }

    async fn heatmap(&self) -> BackendResult<Vec<HeatmapCell>> {
        self.get_json("analytics/heatmap").await
    }

    async fn alerts(&self) -> BackendResult<Vec<Alert>> {
        self.get_json("analytics/alerts").await
    }

    async fn compare(&self, road1: u64, road2: u64) -> BackendResult<RoadComparison> {
        self.get_json(&format!(
            "analytics/compare?road1={}&road2={}",
            road1, road2
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        routing::{get, post},
        Json, Router,
    };
    use std::collections::HashMap;

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/api/login",
                post(|Json(req): Json<LoginRequest>| async move {
                    if req.password == "pw" {
                        Ok(Json(serde_json::json!({
                            "message": "Login successful!",
                            "id": 3,
                            "name": "Asha",
                            "role": "admin"
                        })))
                    } else {
                        Err((
                            StatusCode::UNAUTHORIZED,
                            Json(serde_json::json!({"error": "Invalid password!"})),
                        ))
                    }
                }),
            )
            .route(
                "/api/predict/{id}",
                get(
                    |Path(id): Path<u64>, Query(q): Query<HashMap<String, String>>| async move {
                        Json(serde_json::json!({
                            "road_id": id,
                            "road_name": "MG Road",
                            "hour": format!("{}:00", q.get("hour").cloned().unwrap_or_default()),
                            "weather": q.get("weather").cloned().unwrap_or_default(),
                            "is_holiday": q.get("is_holiday").map(|v| v == "1").unwrap_or(false),
                            "predicted_level": "High",
                            "confidence": "72.5",
                            "suggestion": "x"
                        }))
                    },
                ),
            )
            .route(
                "/api/analytics/compare",
                get(|| async { (StatusCode::NOT_FOUND, "gone") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let b = RemoteBackend::new("http://10.0.0.5:5000/api", Duration::from_secs(1)).unwrap();
        assert_eq!(b.base_url().as_str(), "http://10.0.0.5:5000/api/");
        assert_eq!(
            b.url("analytics/hourly?road_id=2").unwrap().as_str(),
            "http://10.0.0.5:5000/api/analytics/hourly?road_id=2"
        );
        assert!(RemoteBackend::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_forwards_and_decodes() {
        let base = spawn_upstream().await;
        let b = RemoteBackend::new(&base, Duration::from_secs(5)).unwrap();

        let ok = b
            .login(LoginRequest {
                email: "a@b.c".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.id, 3);

        let p = b
            .predict(
                4,
                PredictionQuery {
                    hour: 17,
                    weather: flowguard_model::Weather::Fog,
                    is_holiday: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(p.road_id, 4);
        assert_eq!(p.hour, "17:00");
        assert!(p.is_holiday);
        assert_eq!(p.confidence, 72.5);
    }

    #[tokio::test]
    async fn test_maps_upstream_errors() {
        let base = spawn_upstream().await;
        let b = RemoteBackend::new(&base, Duration::from_secs(5)).unwrap();

        let err = b
            .login(LoginRequest {
                email: "a@b.c".into(),
                password: "bad".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::Unauthorized("Invalid password!".into()));

        // non-JSON error body falls back to the reason phrase
        let err = b.compare(1, 2).await.unwrap_err();
        assert_eq!(err, BackendError::NotFound("Not Found".into()));
    }

    #[tokio::test]
    async fn test_unreachable_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let b = RemoteBackend::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = b.roads().await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
