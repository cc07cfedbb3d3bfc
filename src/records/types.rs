use serde::{Deserialize, Serialize};

/// The recovered session variable bag, as produced by the decoder cascade.
///
/// Only flows decoder -> normalizer; never persisted.
pub type DecodedVars = serde_json::Map<String, serde_json::Value>;

/// One normalized, currently (or recently) active session.
///
/// Every field is always present regardless of origin backend: absent data
/// is an empty string or a `None` user id, never a missing field, so the
/// rendering layer can treat all backends uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Backend-specific identifier (DB session id, Redis key, cache key).
    pub id: String,
    /// Normalized display timestamp, empty if unknown.
    pub last_activity: String,
    pub ip: String,
    /// Present only when recovered as numeric.
    pub user_id: Option<i64>,
    pub username: String,
    /// Backing mail-store host associated with the session.
    pub storage_host: String,
    pub user_agent: String,
}

/// One historical authentication attempt read from the login log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginEvent {
    pub timestamp: String,
    pub user: String,
    pub ip: String,
    /// Free text; legacy log lines carry a fixed "web client" label.
    pub device: String,
    pub success: bool,
}
