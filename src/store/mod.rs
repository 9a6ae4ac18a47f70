//! In-memory tables for the embedded backend.
//!
//! Users, roads, traffic readings and the prediction log live behind a
//! single `RwLock`. When a data directory is configured the tables are
//! snapshotted to `flowguard-data.json` after every mutation. Snapshots are
//! written to a temp file and renamed into place outside the table lock;
//! write failures are logged and never surface to callers.

mod seed;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use flowguard_model::{
    timestamp, CongestionLevel, NewRoad, Prediction, Road, TrafficRecord, Weather,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

pub use seed::DEMO_ROADS;

const SNAPSHOT_FILE: &str = "flowguard-data.json";

fn corrupt_path(path: &Path, ts: i64) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".corrupt-{}", ts));
    PathBuf::from(name)
}

/// Write via a sibling temp file and rename, so readers never see a partial snapshot.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// `salt$sha256hex`
    pub password_hash: String,
    pub role: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(with = "timestamp::wire")]
    pub created_at: NaiveDateTime,
}

/// One served prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLog {
    pub id: u64,
    pub road_id: u64,
    pub predicted_level: CongestionLevel,
    pub confidence: f64,
    pub hour: u32,
    pub weather: Weather,
    pub is_holiday: bool,
    #[serde(with = "timestamp::wire")]
    pub created_at: NaiveDateTime,
}

/// A reading about to be stored; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub road_id: u64,
    pub vehicle_count: u32,
    pub congestion_level: CongestionLevel,
    pub weather: Weather,
    pub is_holiday: bool,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct LastIds {
    user: u64,
    road: u64,
    record: u64,
    prediction: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Every table, as persisted.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    last_ids: LastIds,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub roads: Vec<Road>,
    #[serde(default)]
    pub records: Vec<TrafficRecord>,
    #[serde(default)]
    pub predictions: Vec<PredictionLog>,
}

impl Tables {
    /// Raise id counters past anything already stored (hand-edited snapshots).
    fn repair_ids(&mut self) {
        let ids = &mut self.last_ids;
        ids.user = ids.user.max(self.users.iter().map(|u| u.id).max().unwrap_or(0));
        ids.road = ids.road.max(self.roads.iter().map(|r| r.id).max().unwrap_or(0));
        ids.record = ids
            .record
            .max(self.records.iter().map(|r| r.id).max().unwrap_or(0));
        ids.prediction = ids
            .prediction
            .max(self.predictions.iter().map(|p| p.id).max().unwrap_or(0));
    }

    pub fn road(&self, id: u64) -> Option<&Road> {
        self.roads.iter().find(|r| r.id == id)
    }

    fn push_road(&mut self, road: NewRoad) -> u64 {
        let id = next(&mut self.last_ids.road);
        self.roads.push(Road {
            id,
            road_name: road.road_name,
            area: road.area,
            city: road.city,
            capacity: road.capacity,
        });
        id
    }

    fn push_record(&mut self, reading: NewReading) -> u64 {
        let id = next(&mut self.last_ids.record);
        self.records.push(TrafficRecord {
            id,
            road_id: reading.road_id,
            vehicle_count: reading.vehicle_count,
            weather: reading.weather,
            is_holiday: reading.is_holiday,
            recorded_at: reading.recorded_at,
            congestion_level: reading.congestion_level,
        });
        id
    }
}

pub struct Store {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
    /// Serializes snapshot writes in mutation order.
    save_lock: Mutex<()>,
}

impl Store {
    fn with_tables(tables: Tables, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            tables: RwLock::new(tables),
            snapshot_path,
            save_lock: Mutex::new(()),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_tables(Tables::default(), None)
    }

    /// Open a store, loading `<data_dir>/flowguard-data.json` if present.
    ///
    /// An unparseable snapshot is moved aside to `flowguard-data.json.corrupt-<ts>`
    /// and the store starts empty. A snapshot that cannot be read or moved
    /// is an error.
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = data_dir else {
            return Ok(Self::in_memory());
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        let path = dir.join(SNAPSHOT_FILE);
        let tables = Self::load_snapshot(&path)?.unwrap_or_default();
        Ok(Self::with_tables(tables, Some(path)))
    }

    fn load_snapshot(path: &Path) -> Result<Option<Tables>> {
        if !path.exists() {
            tracing::info!("No snapshot at {}, starting empty", path.display());
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        match serde_json::from_str::<Tables>(&content) {
            Ok(mut tables) => {
                tables.repair_ids();
                tracing::info!(
                    roads = tables.roads.len(),
                    records = tables.records.len(),
                    users = tables.users.len(),
                    "Loaded snapshot from {}",
                    path.display()
                );
                Ok(Some(tables))
            }
            Err(e) => {
                let aside = corrupt_path(path, Utc::now().timestamp());
                std::fs::rename(path, &aside).with_context(|| {
                    format!("Failed to move unreadable snapshot {} aside", path.display())
                })?;
                tracing::warn!(
                    "Snapshot {} is not valid ({}); kept as {}, starting empty",
                    path.display(),
                    e,
                    aside.display()
                );
                Ok(None)
            }
        }
    }

    async fn persist(path: &Path, json: String) {
        if let Err(e) = write_atomic(path, json.as_bytes()).await {
            tracing::error!("Failed to save snapshot {}: {:#}", path.display(), e);
        } else {
            tracing::debug!("Saved snapshot to {}", path.display());
        }
    }

    /// Run `f` against a consistent view of every table.
    pub async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.read().await;
        f(&tables)
    }

    async fn mutate<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.write().await;
        let result = f(&mut tables);
        let Some(path) = &self.snapshot_path else {
            return result;
        };
        let json = match serde_json::to_string_pretty(&*tables) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize snapshot: {}", e);
                return result;
            }
        };
        // Queue for the save before releasing the tables so writes land in order
        let _saving = self.save_lock.lock().await;
        drop(tables);
        Self::persist(path, json).await;
        result
    }

    pub async fn is_empty(&self) -> bool {
        self.read(|t| t.roads.is_empty() && t.records.is_empty())
            .await
    }

    /// Insert an account; `None` when the email is taken (case-insensitive).
    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: String,
        role: &str,
        now: NaiveDateTime,
    ) -> Option<u64> {
        self.mutate(|t| {
            if t.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
                return None;
            }
            let id = next(&mut t.last_ids.user);
            t.users.push(User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role: role.to_string(),
                display_name: None,
                city: None,
                theme: None,
                created_at: now,
            });
            Some(id)
        })
        .await
    }

    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        self.read(|t| {
            t.users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned()
        })
        .await
    }

    /// Apply `f` to the user with `id`; false when there is no such user.
    pub async fn update_user(&self, id: u64, f: impl FnOnce(&mut User)) -> bool {
        self.mutate(|t| match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                f(user);
                true
            }
            None => false,
        })
        .await
    }

    pub async fn road(&self, id: u64) -> Option<Road> {
        self.read(|t| t.road(id).cloned()).await
    }

    pub async fn insert_road(&self, road: NewRoad) -> u64 {
        self.mutate(|t| t.push_road(road)).await
    }

    pub async fn insert_record(&self, reading: NewReading) -> u64 {
        self.mutate(|t| t.push_record(reading)).await
    }

    /// Record a served prediction for the query `hour`.
    pub async fn log_prediction(
        &self,
        prediction: &Prediction,
        hour: u32,
        now: NaiveDateTime,
    ) -> u64 {
        self.mutate(|t| {
            let id = next(&mut t.last_ids.prediction);
            t.predictions.push(PredictionLog {
                id,
                road_id: prediction.road_id,
                predicted_level: prediction.predicted_level,
                confidence: prediction.confidence,
                hour,
                weather: prediction.weather,
                is_holiday: prediction.is_holiday,
                created_at: now,
            });
            id
        })
        .await
    }

    /// Populate an empty store with the demo network; returns readings added.
    pub async fn seed_demo(&self, now: NaiveDateTime) -> usize {
        self.mutate(|t| {
            if !t.roads.is_empty() {
                return 0;
            }
            let (roads, readings) = seed::generate(now);
            let road_ids: Vec<u64> = roads.into_iter().map(|r| t.push_road(r)).collect();
            let mut added = 0;
            for (road_index, reading) in readings {
                let Some(&road_id) = road_ids.get(road_index) else {
                    continue;
                };
                t.push_record(NewReading { road_id, ..reading });
                added += 1;
            }
            added
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        timestamp::parse("2024-01-15 12:30:00").unwrap()
    }

    fn reading(road_id: u64, count: u32) -> NewReading {
        NewReading {
            road_id,
            vehicle_count: count,
            congestion_level: CongestionLevel::from_counts(f64::from(count), 1000),
            weather: Weather::Clear,
            is_holiday: false,
            recorded_at: now(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let store = Store::in_memory();
        let a = store.insert_record(reading(1, 100)).await;
        let b = store.insert_record(reading(1, 200)).await;
        assert!(b > a);

        let road = store
            .insert_road(NewRoad {
                road_name: "Link Road".into(),
                area: "North".into(),
                city: "Pune".into(),
                capacity: 900,
            })
            .await;
        assert_eq!(road, 1);
        assert_eq!(store.road(road).await.unwrap().capacity, 900);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = Store::in_memory();
        let first = store
            .insert_user("Asha", "asha@city.gov", "s$h".into(), "admin", now())
            .await;
        assert_eq!(first, Some(1));
        let dup = store
            .insert_user("Other", "ASHA@city.gov", "s$h".into(), "admin", now())
            .await;
        assert_eq!(dup, None);
    }

    #[tokio::test]
    async fn test_update_user() {
        let store = Store::in_memory();
        let id = store
            .insert_user("Asha", "asha@city.gov", "s$h".into(), "admin", now())
            .await
            .unwrap();
        assert!(store.update_user(id, |u| u.city = Some("Pune".into())).await);
        assert!(!store.update_user(99, |u| u.city = None).await);
        let user = store.user_by_email("asha@city.gov").await.unwrap();
        assert_eq!(user.city.as_deref(), Some("Pune"));
    }

    #[tokio::test]
    async fn test_seed_is_deterministic() {
        let a = Store::in_memory();
        let b = Store::in_memory();
        let added = a.seed_demo(now()).await;
        b.seed_demo(now()).await;

        // 13 full days plus 13 hours (00:00..=12:00) of today, for five roads
        assert_eq!(added, 5 * (13 * 24 + 13));
        let ra = a.read(|t| t.records.clone()).await;
        let rb = b.read(|t| t.records.clone()).await;
        assert_eq!(ra, rb);
        assert_eq!(a.read(|t| t.roads.len()).await, DEMO_ROADS.len());

        // seeding twice is a no-op
        assert_eq!(a.seed_demo(now()).await, 0);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(Some(dir.path())).unwrap();
            store.seed_demo(now()).await;
            store
                .insert_user("Asha", "asha@city.gov", "s$h".into(), "admin", now())
                .await;
        }
        assert!(dir.path().join(SNAPSHOT_FILE).exists());

        assert!(!dir.path().join("flowguard-data.json.tmp").exists());

        let reopened = Store::open(Some(dir.path())).unwrap();
        assert!(!reopened.is_empty().await);
        assert!(reopened.user_by_email("asha@city.gov").await.is_some());

        // ids continue after the loaded ones
        let before = reopened.read(|t| t.records.len() as u64).await;
        let id = reopened.insert_record(reading(1, 10)).await;
        assert_eq!(id, before + 1);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_kept_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let store = Store::open(Some(dir.path())).unwrap();
        assert!(store.is_empty().await);
        store.seed_demo(now()).await;

        let kept: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|n| n.starts_with("flowguard-data.json.corrupt-"))
            .collect();
        assert_eq!(kept.len(), 1);
        let original = std::fs::read_to_string(dir.path().join(&kept[0])).unwrap();
        assert_eq!(original, "{not json");

        // the live snapshot now holds the seeded network
        let reopened = Store::open(Some(dir.path())).unwrap();
        assert_eq!(reopened.read(|t| t.roads.len()).await, DEMO_ROADS.len());
    }

    #[tokio::test]
    async fn test_open_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("flowguard");
        let store = Store::open(Some(&nested)).unwrap();
        store.insert_record(reading(1, 10)).await;
        assert!(nested.join(SNAPSHOT_FILE).exists());
    }

    #[tokio::test]
    async fn test_unusable_data_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();
        assert!(Store::open(Some(&file)).is_err());
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("flowguard-data.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_path_suffix() {
        let p = corrupt_path(Path::new("/var/lib/fg/flowguard-data.json"), 1705321800);
        assert_eq!(p, PathBuf::from("/var/lib/fg/flowguard-data.json.corrupt-1705321800"));
    }
}
