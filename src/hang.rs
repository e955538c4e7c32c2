use serde::{Deserialize, Serialize};

pub type UserID = String;
pub type EventID = String;
pub type CategoryID = String;

pub const AUTH_COOKIE_SUFFIX: &str = "auth-token";
pub const AUTH_COOKIE_BASE64_PREFIX: &str = "base64-";
pub const AUTH_COOKIE_CHUNK_SIZE: usize = 3180;
pub const AUTH_COOKIE_MAX_AGE: std::time::Duration =
    std::time::Duration::from_secs(60 * 60 * 24 * 400);

/// Sessions this close to expiry are refreshed instead of trusted.
pub const SESSION_EXPIRY_MARGIN: std::time::Duration = std::time::Duration::from_secs(90);

pub const JOIN_LATE_THRESHOLD_MINUTES: i64 = 15;
pub const STARTING_SOON_WINDOW_MINUTES: i64 = 120;

/// Upstream response headers that may be relayed back to the browser.
pub const SERIALIZED_RESPONSE_HEADERS: [&str; 2] = ["content-range", "x-supabase-api-version"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserID,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventID,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: CategoryID,
    pub creator_id: UserID,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub max_attendees: Option<u32>,
}
