//! Browser session kept in `localStorage`.
//!
//! The session is loaded once the app hydrates; until then `loaded` is
//! false and guards leave the page alone.

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

const KEY_USER_ID: &str = "userId";
const KEY_USERNAME: &str = "username";
const KEY_ROLE: &str = "role";
const KEY_CITY: &str = "city";
const KEY_THEME: &str = "theme";
const KEY_NOTIFS: &str = "notifs";
const KEY_ONBOARDED: &str = "onboarded";
const KEY_RECENT: &str = "recentTraffic";

/// Max entries kept in the recent-submissions list.
pub const RECENT_LIMIT: usize = 10;

pub const ALL_CITIES: &str = "All Cities";
/// City given to new roads when no specific city is selected.
pub const DEFAULT_ROAD_CITY: &str = "Bangalore";

/// One entry of the "recent submissions" panel on the add-traffic page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSubmission {
    pub road: String,
    pub vehicles: u32,
    pub weather: String,
    pub level: String,
    pub date: String,
    pub hour: u32,
    /// Wall-clock time of the submission, `HH:MM`
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub loaded: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub theme: Option<String>,
    pub notifs: bool,
    pub onboarded: bool,
    pub recent: Vec<RecentSubmission>,
}

impl Session {
    /// Read every key from storage.
    pub fn load() -> Self {
        let recent = storage::get(KEY_RECENT)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            loaded: true,
            user_id: storage::get(KEY_USER_ID),
            username: storage::get(KEY_USERNAME),
            role: storage::get(KEY_ROLE),
            city: storage::get(KEY_CITY),
            theme: storage::get(KEY_THEME),
            notifs: storage::get(KEY_NOTIFS).as_deref() != Some("0"),
            onboarded: storage::get(KEY_ONBOARDED).as_deref() == Some("1"),
            recent,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Where a signed-in user lands: the dashboard once a city is chosen.
    pub fn needs_onboarding(&self) -> bool {
        self.city.as_deref().map_or(true, str::is_empty)
    }

    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("User")
    }

    /// Avatar letter.
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }

    pub fn city_label(&self) -> &str {
        self.city
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(ALL_CITIES)
    }

    /// City stamped on roads added from the roads page.
    pub fn road_city(&self) -> &str {
        match self.city.as_deref() {
            Some(c) if !c.is_empty() && c != ALL_CITIES => c,
            _ => DEFAULT_ROAD_CITY,
        }
    }

    pub fn sign_in(&mut self, user_id: String, username: String, role: String) {
        storage::set(KEY_USER_ID, &user_id);
        storage::set(KEY_USERNAME, &username);
        storage::set(KEY_ROLE, &role);
        self.user_id = Some(user_id);
        self.username = Some(username);
        self.role = Some(role);
    }

    /// Persist the onboarding wizard's choices.
    pub fn finish_onboarding(
        &mut self,
        username: String,
        role: String,
        city: String,
        theme: String,
        notifs: bool,
    ) {
        storage::set(KEY_USERNAME, &username);
        storage::set(KEY_ROLE, &role);
        storage::set(KEY_CITY, &city);
        storage::set(KEY_THEME, &theme);
        storage::set(KEY_NOTIFS, if notifs { "1" } else { "0" });
        storage::set(KEY_ONBOARDED, "1");
        self.username = Some(username);
        self.role = Some(role);
        self.city = Some(city);
        self.theme = Some(theme);
        self.notifs = notifs;
        self.onboarded = true;
    }

    pub fn set_theme(&mut self, theme: &str) {
        storage::set(KEY_THEME, theme);
        self.theme = Some(theme.to_string());
    }

    /// Newest first, capped at [`RECENT_LIMIT`].
    pub fn push_recent(&mut self, item: RecentSubmission) {
        self.recent.insert(0, item);
        self.recent.truncate(RECENT_LIMIT);
        match serde_json::to_string(&self.recent) {
            Ok(raw) => storage::set(KEY_RECENT, &raw),
            Err(e) => tracing::warn!("Failed to store recent submissions: {}", e),
        }
    }

    /// Sign out: wipes every stored key.
    pub fn clear(&mut self) {
        storage::clear();
        *self = Self {
            loaded: true,
            ..Self::default()
        };
    }
}

/// Provide the session signal at the app root and fill it after hydration.
pub fn use_session_provider() -> Signal<Session> {
    let mut session = use_context_provider(|| Signal::new(Session::default()));
    use_effect(move || {
        session.set(Session::load());
    });
    session
}

pub fn use_session() -> Signal<Session> {
    use_context::<Signal<Session>>()
}

#[cfg(target_arch = "wasm32")]
mod storage {
    fn local() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    pub fn get(key: &str) -> Option<String> {
        local()?.get_item(key).ok()?
    }

    pub fn set(key: &str, value: &str) {
        if let Some(s) = local() {
            let _ = s.set_item(key, value);
        }
    }

    pub fn clear() {
        if let Some(s) = local() {
            let _ = s.clear();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod storage {
    pub fn get(_key: &str) -> Option<String> {
        None
    }

    pub fn set(_key: &str, _value: &str) {}

    pub fn clear() {}
}
