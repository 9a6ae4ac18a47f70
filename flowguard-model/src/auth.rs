//! Account and profile bodies.

use serde::{Deserialize, Serialize};

use crate::de::null_default;

/// Role given to accounts registered without one.
pub const DEFAULT_ROLE: &str = "admin";

/// Selectable roles with the blurb shown under the picker.
pub const ROLES: [(&str, &str); 4] = [
    (
        "admin",
        "Full system access, manage users, roads, and all analytics",
    ),
    (
        "Traffic Analyst",
        "Analyze congestion data and generate traffic reports",
    ),
    (
        "City Planner",
        "Plan road infrastructure using data-driven insights",
    ),
    (
        "Traffic Officer",
        "Monitor live alerts and manage on-ground traffic response",
    ),
];

pub fn role_description(role: &str) -> &'static str {
    ROLES
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, desc)| *desc)
        .unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Body of `POST /profile/update`, sent when onboarding finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Numeric for real accounts; `demo-…`/`new-…` ids are rejected
    #[serde(default, deserialize_with = "null_default")]
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

/// `{"message": ...}` success body, with the new row's id on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn created(message: impl Into<String>, id: u64) -> Self {
        Self {
            message: message.into(),
            id: Some(id),
        }
    }
}

/// `{"error": ...}` failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
