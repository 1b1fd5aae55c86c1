//! Narrow seam over the session document store.
//!
//! The store owns the `live_sessions` collection and each session's
//! `waitingRoom` sub-collection; the orchestrator only issues the writes
//! below and consumes full-list snapshots of the waiting room.

use async_trait::async_trait;
use live_core::{EntryId, EntryStatus, LiveError, NewLiveSession, SessionId, WaitingEntry};
use tokio::sync::mpsc;

/// Live feed of waiting-room snapshots, ordered by `joinedAt` ascending.
/// Every message is the full list, never a diff. Dropping the receiver
/// unsubscribes.
pub type WaitingRoomFeed = mpsc::Receiver<Vec<WaitingEntry>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates the session record with status `live` and returns its id.
    async fn create_session(&self, new: NewLiveSession) -> Result<SessionId, LiveError>;

    /// Marks the session record ended. Terminal: the record is never
    /// mutated afterwards.
    async fn end_session(&self, id: &SessionId) -> Result<(), LiveError>;

    /// Flips the session's `inConsultation` flag.
    async fn set_in_consultation(&self, id: &SessionId, active: bool) -> Result<(), LiveError>;

    /// Transitions one waiting-room entry. The returned future resolves only
    /// once the write is acknowledged, which the admission sequence relies
    /// on for its at-most-one-in-session guarantee.
    async fn set_entry_status(
        &self,
        id: &SessionId,
        entry: &EntryId,
        status: EntryStatus,
    ) -> Result<(), LiveError>;

    /// Subscribes to the session's waiting room. The store delivers an
    /// initial snapshot promptly and a fresh one after every change.
    async fn subscribe_waiting_room(&self, id: &SessionId) -> Result<WaitingRoomFeed, LiveError>;
}
