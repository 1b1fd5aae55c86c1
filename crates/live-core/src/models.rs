//! Session and waiting-room documents.
//!
//! Wire names are camelCase to match the store collection shape
//! (`live_sessions/{id}` and its `waitingRoom` sub-collection).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque id of a live-session record, assigned by the store at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque id of a waiting-room entry, scoped to its parent session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Orchestrator phase. `Ending` is transient and always returns to `Setup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Preview,
    Live,
    Ending,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Setup => "setup",
            Phase::Preview => "preview",
            Phase::Live => "live",
            Phase::Ending => "ending",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Live,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "in-session")]
    InSession,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "left")]
    Left,
}

/// One broadcast instance, as persisted in `live_sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    pub id: SessionId,
    pub title: String,
    pub status: SessionStatus,
    /// Best-effort UI signal, not a billing-grade metric.
    pub viewer_count: u32,
    pub host_uid: u32,
    pub started_at: DateTime<Utc>,
    pub agora_channel: String,
    /// Audience clients read this back to join the channel.
    pub agora_token: String,
    pub in_consultation: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields written when a session record is first created (status is always
/// `live` at creation; the store assigns the id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLiveSession {
    pub title: String,
    pub host_uid: u32,
    pub agora_channel: String,
    pub agora_token: String,
}

/// One audience member in the consultation queue, as persisted in
/// `live_sessions/{id}/waitingRoom/{entryId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingEntry {
    pub id: EntryId,
    pub user_id: String,
    pub user_name: String,
    pub status: EntryStatus,
    pub joined_at: DateTime<Utc>,
}

impl WaitingEntry {
    /// "Joined Ns/Nm/Nh ago" label for the entry's queue row.
    pub fn waited_label(&self, now: DateTime<Utc>) -> String {
        crate::fmt::time_ago(self.joined_at, now)
    }
}

/// Default channel name for a fresh session. Uuid-based rather than
/// wall-clock-based so two operator sessions cannot collide.
pub fn generate_channel_name() -> String {
    format!("rivnitz-live-{}", Uuid::new_v4().simple())
}
