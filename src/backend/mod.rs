//! Traffic backends behind the REST surface.
//!
//! Every endpoint is one method on [`TrafficBackend`]. Two implementations
//! exist: [`EmbeddedBackend`] answers from the in-process store, and
//! [`RemoteBackend`] forwards to an external service speaking the same
//! contract.

pub mod embedded;
pub mod remote;

use async_trait::async_trait;
use axum::http::StatusCode;
use flowguard_model::{
    Alert, DashboardSummary, HeatmapCell, HistoryFilter, HistoryRow, HourlyPoint, LoginRequest,
    LoginResponse, MessageResponse, NewRoad, NewTrafficRecord, Prediction, PredictionQuery,
    ProfileUpdate, RegisterRequest, RoadComparison, RoadStatus, RoadUsage, TrafficAdded,
    TrendPoint,
};

pub use embedded::EmbeddedBackend;
pub use remote::RemoteBackend;

/// Failures surfaced to API clients as `{"error": msg}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("{0}")]
    Invalid(String),
    /// Uniqueness violations; reported as 400 like other bad input
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl BackendError {
    pub fn missing_fields() -> Self {
        Self::Invalid("Missing fields!".to_string())
    }

    pub fn road_not_found() -> Self {
        Self::NotFound("Road not found!".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Rebuild an error from an upstream status code and message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Invalid(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                Self::Unavailable(message)
            }
            _ => Self::Internal(message),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One async operation per REST endpoint.
#[async_trait]
pub trait TrafficBackend: Send + Sync {
    /// Short name reported by `/status`.
    fn kind(&self) -> &'static str;

    async fn login(&self, req: LoginRequest) -> BackendResult<LoginResponse>;
    async fn register(&self, req: RegisterRequest) -> BackendResult<MessageResponse>;
    async fn update_profile(&self, update: ProfileUpdate) -> BackendResult<MessageResponse>;

    async fn roads(&self) -> BackendResult<Vec<RoadStatus>>;
    async fn add_road(&self, road: NewRoad) -> BackendResult<MessageResponse>;

    async fn add_traffic(&self, record: NewTrafficRecord) -> BackendResult<TrafficAdded>;
    async fn history(&self, filter: &HistoryFilter) -> BackendResult<Vec<HistoryRow>>;

    async fn predict(&self, road_id: u64, query: PredictionQuery) -> BackendResult<Prediction>;

    async fn dashboard(&self) -> BackendResult<DashboardSummary>;
    async fn roadwise(&self) -> BackendResult<Vec<RoadUsage>>;
    async fn hourly(&self, road_id: Option<u64>) -> BackendResult<Vec<HourlyPoint>>;
    async fn trend(&self) -> BackendResult<Vec<TrendPoint>>;
    async fn heatmap(&self) -> BackendResult<Vec<HeatmapCell>>;
    async fn alerts(&self) -> BackendResult<Vec<Alert>>;
    async fn compare(&self, road1: u64, road2: u64) -> BackendResult<RoadComparison>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_round_trips() {
        let cases = [
            BackendError::Invalid("x".into()),
            BackendError::Unauthorized("x".into()),
            BackendError::NotFound("x".into()),
            BackendError::Unavailable("x".into()),
            BackendError::Internal("x".into()),
        ];
        for err in cases {
            let back = BackendError::from_status(err.status(), "x".into());
            assert_eq!(back, err);
        }
        assert_eq!(
            BackendError::Conflict("Email already exists!".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(BackendError::missing_fields().to_string(), "Missing fields!");
        assert_eq!(BackendError::road_not_found().to_string(), "Road not found!");
        assert!(BackendError::Unavailable("timeout".into())
            .to_string()
            .contains("timeout"));
    }
}
