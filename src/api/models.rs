use serde::{Deserialize, Serialize};

/// One catalog entry as the server lists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSummary {
    pub id: u64,
    pub original_name: String,
    pub singer: String,
    /// Play time in seconds.
    pub play_time: u64,
}

/// The authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub nickname: String,
    pub email: String,
}

/// Payload for account creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub nickname: String,
    pub email: String,
    pub password: String,
}
