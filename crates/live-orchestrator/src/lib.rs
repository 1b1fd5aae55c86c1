//! Live Session Orchestrator.
//!
//! Drives a broadcaster from camera setup through a live broadcast with an
//! ordered, single-admission consultation queue, to teardown. The vendor
//! conferencing SDK and the document store sit behind the [`MediaTransport`]
//! and [`SessionStore`] traits so the state machine never sees their types
//! and can be exercised with in-memory fakes.
//!
//! The orchestrator owns no durable state: the session record and its
//! waiting-room list live in the store, and the orchestrator holds only a
//! transient projection (phase, counters, latest waiting-room view).

pub mod config;
pub mod media;
pub mod orchestrator;
pub mod store;
pub mod token;
pub mod transport;

pub use config::OrchestratorConfig;
pub use media::{render_gate, RenderGate, SurfaceHandle, Surfaces, LIVE_SURFACE, PREVIEW_SURFACE};
pub use orchestrator::LiveOrchestrator;
pub use store::{SessionStore, WaitingRoomFeed};
pub use token::{ChannelCredential, HttpTokenIssuer, TokenIssuer};
pub use transport::{LocalTrack, MediaTransport, TrackKind, TransportEvent};
