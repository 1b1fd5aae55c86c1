//! Narrow seam over the real-time conferencing SDK.
//!
//! Only the operations the orchestrator needs are exposed; SDK types never
//! cross this boundary.

use async_trait::async_trait;
use live_core::LiveError;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Camera,
    Microphone,
}

/// A local capture (camera or microphone) owned by the broadcaster side.
#[async_trait]
pub trait LocalTrack: Send + Sync {
    fn kind(&self) -> TrackKind;

    /// Enables or disables the track at the transport level. Used by the
    /// mute / pause-camera toggles; no session-record write is involved.
    async fn set_enabled(&self, enabled: bool) -> Result<(), LiveError>;

    /// Renders the track into a named display surface. The caller must make
    /// sure the surface is mounted first (see [`crate::media::RenderGate`]).
    async fn play(&self, surface: &str) -> Result<(), LiveError>;

    /// Stops capture and releases the device. Must be idempotent: a second
    /// call is a no-op, never an error.
    async fn stop(&self);
}

/// Viewer membership events, used only to adjust the local viewer counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    ViewerJoined,
    ViewerLeft,
}

#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Acquires the local camera capture. Fails with `PermissionDenied` when
    /// the operator refuses access or no device is available.
    async fn create_camera_track(&self) -> Result<Arc<dyn LocalTrack>, LiveError>;

    async fn create_microphone_track(&self) -> Result<Arc<dyn LocalTrack>, LiveError>;

    /// Joins `channel` as the publishing host. The token must be freshly
    /// issued for this exact channel and uid. Returns the feed of viewer
    /// join/leave events for the joined channel.
    async fn join(
        &self,
        app_id: &str,
        channel: &str,
        token: &str,
        uid: u32,
    ) -> Result<mpsc::Receiver<TransportEvent>, LiveError>;

    /// Publishes local tracks. Only valid after a successful join; after a
    /// failed publish the caller must leave the channel before retrying.
    async fn publish(&self, tracks: Vec<Arc<dyn LocalTrack>>) -> Result<(), LiveError>;

    async fn leave(&self) -> Result<(), LiveError>;
}
