//! Shared wire types for the FlowGuard traffic dashboard.
//!
//! This crate defines the records that cross the boundary between:
//! - the FlowGuard server (embedded backend or remote forwarder)
//! - the browser UI (Dioxus, compiled to WASM)
//! - any external service speaking the same REST contract
//!
//! # Modules
//! - [`level`] - congestion levels and the capacity-ratio bucketing rule
//! - [`road`] - road registry records
//! - [`traffic`] - traffic readings, history rows, CSV export
//! - [`alert`] - congestion alerts and client-side alert filtering
//! - [`analytics`] - dashboard/aggregation response shapes
//! - [`prediction`] - prediction responses and the offline demo heuristic
//! - [`auth`] - login, registration and profile bodies
//! - [`timestamp`] - tolerant timestamp parsing for backend payloads
//! - [`de`] - lenient field deserializers for loosely typed backends

pub mod alert;
pub mod analytics;
pub mod auth;
pub mod de;
pub mod level;
pub mod prediction;
pub mod road;
pub mod timestamp;
pub mod traffic;
pub mod weather;

// Re-export commonly used types at crate root
pub use alert::{Alert, AlertFilter, AlertLevelFilter, AlertStats};
pub use analytics::{
    DashboardSummary, HeatmapCell, HourlyPoint, RoadComparison, RoadProfile, RoadStats,
    RoadUsage, TrendPoint,
};
pub use auth::{ErrorBody, LoginRequest, LoginResponse, MessageResponse, ProfileUpdate, RegisterRequest};
pub use level::{CongestionLevel, LevelCounts};
pub use prediction::{Prediction, PredictionQuery};
pub use road::{NetworkStats, NewRoad, Road, RoadStatus};
pub use traffic::{
    HistoryFilter, HistoryRow, HistoryStats, NewTrafficRecord, TrafficAdded, TrafficRecord,
};
pub use weather::Weather;
