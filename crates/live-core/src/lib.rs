//! Domain model for Rivnitz live sessions.
//!
//! Shared between the broadcaster-side orchestrator and the token service:
//! session/waiting-room documents, the phase and status enums, the
//! waiting-room reducer, and the error taxonomy.

pub mod error;
pub mod fmt;
pub mod models;
pub mod waiting_room;

pub use error::LiveError;
pub use models::{
    EntryId, EntryStatus, LiveSession, NewLiveSession, Phase, SessionId, SessionStatus,
    WaitingEntry,
};
pub use waiting_room::WaitingRoomView;
