//! Local media ownership and render sequencing.
//!
//! Two hazards live here. First, rendering into a display surface that is
//! not mounted yet: the orchestrator awaits a [`RenderGate`] the UI flips
//! when the surface attaches, instead of relying on scheduling timing.
//! Second, double release of a capture: tracks are held in `Option`s and
//! taken exactly once, and `LocalTrack::stop` is itself required to be
//! idempotent.

use crate::transport::LocalTrack;
use std::sync::Arc;
use tokio::sync::watch;

/// Surface the camera renders into during setup/preview.
pub const PREVIEW_SURFACE: &str = "preview-container";
/// Surface the camera renders into while live.
pub const LIVE_SURFACE: &str = "live-container";

/// UI-side handle: flipped when the display surface mounts or unmounts.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    tx: watch::Sender<bool>,
}

impl SurfaceHandle {
    pub fn mounted(&self) {
        let _ = self.tx.send(true);
    }

    pub fn unmounted(&self) {
        let _ = self.tx.send(false);
    }
}

/// Orchestrator-side readiness signal for one display surface.
#[derive(Debug, Clone)]
pub struct RenderGate {
    rx: watch::Receiver<bool>,
    /// Set only for [`RenderGate::always_ready`] gates, which have no UI
    /// handle keeping the channel open.
    keepalive: Option<Arc<watch::Sender<bool>>>,
}

impl RenderGate {
    /// Resolves once the surface is mounted. Returns immediately when it
    /// already is. Also resolves if the UI side went away entirely, in
    /// which case rendering is pointless but must not deadlock teardown.
    pub async fn ready(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// A gate that is always ready; for headless use and tests.
    pub fn always_ready() -> Self {
        let (tx, rx) = watch::channel(true);
        Self {
            rx,
            keepalive: Some(Arc::new(tx)),
        }
    }
}

/// Creates a surface readiness pair, initially unmounted.
pub fn render_gate() -> (SurfaceHandle, RenderGate) {
    let (tx, rx) = watch::channel(false);
    (
        SurfaceHandle { tx },
        RenderGate {
            rx,
            keepalive: None,
        },
    )
}

/// The orchestrator's two display surfaces.
#[derive(Debug, Clone)]
pub struct Surfaces {
    pub preview: RenderGate,
    pub live: RenderGate,
}

impl Surfaces {
    pub fn always_ready() -> Self {
        Self {
            preview: RenderGate::always_ready(),
            live: RenderGate::always_ready(),
        }
    }
}

/// Owner of the local captures. Release is exactly-once per track.
#[derive(Default)]
pub struct TrackSet {
    camera: Option<Arc<dyn LocalTrack>>,
    microphone: Option<Arc<dyn LocalTrack>>,
}

impl TrackSet {
    pub fn set_camera(&mut self, track: Arc<dyn LocalTrack>) {
        self.camera = Some(track);
    }

    pub fn set_microphone(&mut self, track: Arc<dyn LocalTrack>) {
        self.microphone = Some(track);
    }

    pub fn camera(&self) -> Option<Arc<dyn LocalTrack>> {
        self.camera.clone()
    }

    pub fn microphone(&self) -> Option<Arc<dyn LocalTrack>> {
        self.microphone.clone()
    }

    /// Takes the camera out for release; `None` if already released.
    pub fn take_camera(&mut self) -> Option<Arc<dyn LocalTrack>> {
        self.camera.take()
    }

    pub fn take_microphone(&mut self) -> Option<Arc<dyn LocalTrack>> {
        self.microphone.take()
    }
}

/// Stops a released track, if there was one. Safe to call with `None`
/// (already released), which makes every teardown path double-release safe.
pub async fn release(track: Option<Arc<dyn LocalTrack>>) {
    if let Some(track) = track {
        track.stop().await;
    }
}
