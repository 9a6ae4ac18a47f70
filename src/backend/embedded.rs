//! Backend answering from the in-process [`Store`].

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use flowguard_model::{
    auth::DEFAULT_ROLE, timestamp, Alert, CongestionLevel, DashboardSummary, HeatmapCell,
    HistoryFilter, HistoryRow, HourlyPoint, LoginRequest, LoginResponse, MessageResponse, NewRoad,
    NewTrafficRecord, Prediction, PredictionQuery, ProfileUpdate, RegisterRequest, RoadComparison,
    RoadStatus, RoadUsage, TrafficAdded, TrendPoint,
};
use std::sync::Arc;

use super::{BackendError, BackendResult, TrafficBackend};
use crate::store::{NewReading, Store};
use crate::{analytics, auth, predict};

/// Source of "now" for timestamps and today's aggregates.
pub type Clock = fn() -> NaiveDateTime;

pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub struct EmbeddedBackend {
    store: Arc<Store>,
    clock: Clock,
}

impl EmbeddedBackend {
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_clock(store, local_now)
    }

    pub fn with_clock(store: Arc<Store>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

#[async_trait]
impl TrafficBackend for EmbeddedBackend {
    fn kind(&self) -> &'static str {
        "embedded"
    }

    async fn login(&self, req: LoginRequest) -> BackendResult<LoginResponse> {
        if blank(&req.email) || req.password.is_empty() {
            return Err(BackendError::missing_fields());
        }
        let user = self
            .store
            .user_by_email(req.email.trim())
            .await
            .ok_or_else(|| BackendError::NotFound("User not found!".to_string()))?;
        if !auth::verify_password(&req.password, &user.password_hash) {
            tracing::debug!(user_id = user.id, "Rejected login");
            return Err(BackendError::Unauthorized("Invalid password!".to_string()));
        }
        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginResponse {
            message: "Login successful!".to_string(),
            id: user.id,
            name: user.name,
            role: user.role,
        })
    }

    async fn register(&self, req: RegisterRequest) -> BackendResult<MessageResponse> {
        if blank(&req.name) || blank(&req.email) || req.password.is_empty() {
            return Err(BackendError::missing_fields());
        }
        if !auth::is_valid_email(&req.email) {
            return Err(BackendError::Invalid("Invalid email address!".to_string()));
        }
        let role = req
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE);
        let hash = auth::hash_password(&req.password);
        let id = self
            .store
            .insert_user(req.name.trim(), req.email.trim(), hash, role, self.now())
            .await
            .ok_or_else(|| BackendError::Conflict("Email already exists!".to_string()))?;
        tracing::info!(user_id = id, role, "Registered user");
        Ok(MessageResponse::created("Registered successfully!", id))
    }

    async fn update_profile(&self, update: ProfileUpdate) -> BackendResult<MessageResponse> {
        let id: u64 = update
            .user_id
            .trim()
            .parse()
            .map_err(|_| BackendError::Invalid("Invalid user id!".to_string()))?;
        let found = self
            .store
            .update_user(id, |user| {
                if let Some(name) = update.display_name {
                    user.display_name = Some(name);
                }
                if let Some(city) = update.city {
                    user.city = Some(city);
                }
                if let Some(role) = update.role.filter(|r| !blank(r)) {
                    user.role = role;
                }
                if let Some(theme) = update.theme {
                    user.theme = Some(theme);
                }
            })
            .await;
        if !found {
            return Err(BackendError::NotFound("User not found!".to_string()));
        }
        Ok(MessageResponse::new("Profile updated!"))
    }

    async fn roads(&self) -> BackendResult<Vec<RoadStatus>> {
        Ok(self
            .store
            .read(|t| analytics::road_statuses(&t.roads, &t.records))
            .await)
    }

    async fn add_road(&self, road: NewRoad) -> BackendResult<MessageResponse> {
        if blank(&road.road_name) || blank(&road.area) || blank(&road.city) {
            return Err(BackendError::missing_fields());
        }
        let road = NewRoad {
            road_name: road.road_name.trim().to_string(),
            area: road.area.trim().to_string(),
            city: road.city.trim().to_string(),
            capacity: road.capacity,
        };
        let id = self.store.insert_road(road).await;
        tracing::info!(road_id = id, "Added road");
        Ok(MessageResponse::created("Road added successfully!", id))
    }

    async fn add_traffic(&self, record: NewTrafficRecord) -> BackendResult<TrafficAdded> {
        let road = self
            .store
            .road(record.road_id)
            .await
            .ok_or_else(BackendError::road_not_found)?;
        let recorded_at = match record.recorded_at.as_deref().filter(|s| !blank(s)) {
            Some(raw) => timestamp::parse(raw)
                .ok_or_else(|| BackendError::Invalid("Invalid recorded_at!".to_string()))?,
            None => self.now(),
        };
        let level = CongestionLevel::from_counts(f64::from(record.vehicle_count), road.capacity);
        self.store
            .insert_record(NewReading {
                road_id: road.id,
                vehicle_count: record.vehicle_count,
                congestion_level: level,
                weather: record.weather.unwrap_or_default(),
                is_holiday: record.is_holiday.unwrap_or(false),
                recorded_at,
            })
            .await;
        tracing::debug!(road_id = road.id, %level, "Stored reading");
        Ok(TrafficAdded {
            message: "Traffic data added!".to_string(),
            congestion_level: level,
            suggestion: level.suggestion().to_string(),
        })
    }

    async fn history(&self, filter: &HistoryFilter) -> BackendResult<Vec<HistoryRow>> {
        Ok(self
            .store
            .read(|t| analytics::history(&t.roads, &t.records, filter))
            .await)
    }

    async fn predict(&self, road_id: u64, query: PredictionQuery) -> BackendResult<Prediction> {
        let now = self.now();
        let weekday = now.weekday();
        let prediction = self
            .store
            .read(|t| {
                let road = t.road(road_id)?;
                Some(predict::predict(
                    road,
                    &t.records,
                    &query,
                    weekday,
                    &mut rand::thread_rng(),
                ))
            })
            .await
            .ok_or_else(BackendError::road_not_found)?;
        self.store.log_prediction(&prediction, query.hour, now).await;
        tracing::info!(
            road_id,
            level = %prediction.predicted_level,
            confidence = prediction.confidence,
            "Served prediction"
        );
        Ok(prediction)
    }

    async fn dashboard(&self) -> BackendResult<DashboardSummary> {
        let now = self.now();
        Ok(self
            .store
            .read(|t| analytics::dashboard(&t.roads, &t.records, now))
            .await)
    }

    async fn roadwise(&self) -> BackendResult<Vec<RoadUsage>> {
        Ok(self
            .store
            .read(|t| analytics::roadwise(&t.roads, &t.records))
            .await)
    }

    async fn hourly(&self, road_id: Option<u64>) -> BackendResult<Vec<HourlyPoint>> {
        Ok(self
            .store
            .read(|t| analytics::hourly(&t.records, road_id))
            .await)
    }

    async fn trend(&self) -> BackendResult<Vec<TrendPoint>> {
        Ok(self.store.read(|t| analytics::trend(&t.records)).await)
    }

    async fn heatmap(&self) -> BackendResult<Vec<HeatmapCell>> {
        Ok(self.store.read(|t| analytics::heatmap(&t.records)).await)
    }

    async fn alerts(&self) -> BackendResult<Vec<Alert>> {
        Ok(self
            .store
            .read(|t| analytics::alerts(&t.roads, &t.records))
            .await)
    }

    async fn compare(&self, road1: u64, road2: u64) -> BackendResult<RoadComparison> {
        self.store
            .read(|t| analytics::compare(&t.roads, &t.records, road1, road2))
            .await
            .ok_or_else(BackendError::road_not_found)
    }
}
