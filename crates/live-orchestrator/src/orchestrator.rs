//! The live-session phase machine and its admission commands.
//!
//! Single-operator, event-driven: every mutating command runs under an
//! explicit in-flight guard, so no two mutating commands for the same
//! session overlap. Store writes are awaited and their failures returned to
//! the caller; nothing here is fire-and-forget.

use crate::config::OrchestratorConfig;
use crate::media::{release, Surfaces, TrackSet, LIVE_SURFACE, PREVIEW_SURFACE};
use crate::store::SessionStore;
use crate::token::TokenIssuer;
use crate::transport::{MediaTransport, TransportEvent};
use live_core::models::generate_channel_name;
use live_core::{EntryId, EntryStatus, LiveError, NewLiveSession, Phase, SessionId, WaitingRoomView};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct State {
    phase: Phase,
    title: String,
    channel_name: String,
    session_id: Option<SessionId>,
    tracks: TrackSet,
    mic_muted: bool,
    camera_off: bool,
    timer_task: Option<JoinHandle<()>>,
    viewer_task: Option<JoinHandle<()>>,
    feed_task: Option<JoinHandle<()>>,
}

/// Resets the in-flight flag when the command handler returns on any path.
struct CommandGuard<'a>(&'a AtomicBool);

impl Drop for CommandGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct LiveOrchestrator {
    transport: Arc<dyn MediaTransport>,
    store: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenIssuer>,
    config: OrchestratorConfig,
    surfaces: Surfaces,

    state: Mutex<State>,
    command_in_flight: AtomicBool,

    // Shared with the background tasks spawned while live.
    viewer_count: Arc<AtomicU32>,
    elapsed_secs: Arc<AtomicU64>,
    waiting_room: Arc<RwLock<WaitingRoomView>>,
}

impl LiveOrchestrator {
    pub fn new(
        transport: Arc<dyn MediaTransport>,
        store: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenIssuer>,
        config: OrchestratorConfig,
        surfaces: Surfaces,
    ) -> Self {
        let title = config.default_title.clone();
        Self {
            transport,
            store,
            tokens,
            config,
            surfaces,
            state: Mutex::new(State {
                phase: Phase::Setup,
                title,
                channel_name: generate_channel_name(),
                session_id: None,
                tracks: TrackSet::default(),
                mic_muted: false,
                camera_off: false,
                timer_task: None,
                viewer_task: None,
                feed_task: None,
            }),
            command_in_flight: AtomicBool::new(false),
            viewer_count: Arc::new(AtomicU32::new(0)),
            elapsed_secs: Arc::new(AtomicU64::new(0)),
            waiting_room: Arc::new(RwLock::new(WaitingRoomView::default())),
        }
    }

    // ---- projections ----------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn title(&self) -> String {
        self.lock_state().title.clone()
    }

    pub fn channel_name(&self) -> String {
        self.lock_state().channel_name.clone()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock_state().session_id.clone()
    }

    pub fn viewer_count(&self) -> u32 {
        self.viewer_count.load(Ordering::SeqCst)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    /// Elapsed broadcast time as the header clock shows it (`MM:SS`, or
    /// `H:MM:SS` past an hour).
    pub fn elapsed_label(&self) -> String {
        live_core::fmt::format_duration(self.elapsed_secs())
    }

    pub fn mic_muted(&self) -> bool {
        self.lock_state().mic_muted
    }

    pub fn camera_off(&self) -> bool {
        self.lock_state().camera_off
    }

    /// Latest waiting-room projection, recomputed from each store snapshot.
    pub fn waiting_room(&self) -> WaitingRoomView {
        self.waiting_room
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Session title and channel name are editable only before the camera
    /// test; both inputs lock once the preview starts.
    pub fn set_title(&self, title: &str) -> Result<(), LiveError> {
        let mut state = self.lock_state();
        if state.phase != Phase::Setup {
            return Err(LiveError::InvalidCommand(format!(
                "title cannot change while {}",
                state.phase
            )));
        }
        state.title = title.to_string();
        Ok(())
    }

    pub fn set_channel_name(&self, channel_name: &str) -> Result<(), LiveError> {
        let mut state = self.lock_state();
        if state.phase != Phase::Setup {
            return Err(LiveError::InvalidCommand(format!(
                "channel cannot change while {}",
                state.phase
            )));
        }
        state.channel_name = channel_name.to_string();
        Ok(())
    }

    // ---- phase commands -------------------------------------------------

    /// `setup -> preview`: acquires the camera and renders it into the
    /// preview surface. On failure the machine stays in `setup`, the error
    /// message is the capture failure verbatim, and no track is left
    /// acquired.
    pub async fn start_preview(&self) -> Result<(), LiveError> {
        let _guard = self.begin_command()?;
        {
            let state = self.lock_state();
            if state.phase != Phase::Setup {
                return Err(LiveError::InvalidCommand(format!(
                    "cannot test camera while {}",
                    state.phase
                )));
            }
            if state.title.trim().is_empty() || state.channel_name.trim().is_empty() {
                return Err(LiveError::InvalidCommand(
                    "session title and channel name are required".to_string(),
                ));
            }
        }

        let camera = self.transport.create_camera_track().await?;

        self.surfaces.preview.ready().await;
        if let Err(err) = camera.play(PREVIEW_SURFACE).await {
            camera.stop().await;
            return Err(err);
        }

        let mut state = self.lock_state();
        state.tracks.set_camera(camera);
        state.phase = Phase::Preview;
        info!(channel = %state.channel_name, "camera preview started");
        Ok(())
    }

    /// `preview -> setup`: releases the camera.
    pub async fn cancel_preview(&self) -> Result<(), LiveError> {
        let _guard = self.begin_command()?;
        let camera = {
            let mut state = self.lock_state();
            if state.phase != Phase::Preview {
                return Err(LiveError::InvalidCommand(format!(
                    "no preview to cancel while {}",
                    state.phase
                )));
            }
            state.tracks.take_camera()
        };
        release(camera).await;
        self.lock_state().phase = Phase::Setup;
        Ok(())
    }

    /// `preview -> live`: token, join, microphone, publish, session record,
    /// waiting-room subscription, in that order. Any failure before the
    /// record exists aborts the attempt: the microphone is released and the
    /// channel left, but the preview camera is kept so the operator can
    /// retry from `preview`.
    pub async fn go_live(&self) -> Result<(), LiveError> {
        let _guard = self.begin_command()?;
        let (title, channel, camera) = {
            let state = self.lock_state();
            if state.phase != Phase::Preview {
                return Err(LiveError::InvalidCommand(format!(
                    "cannot go live while {}",
                    state.phase
                )));
            }
            let camera = state.tracks.camera().ok_or_else(|| {
                LiveError::InvalidCommand("preview camera capture is missing".to_string())
            })?;
            (state.title.clone(), state.channel_name.clone(), camera)
        };
        let uid = self.config.host_uid;

        let credential = self
            .bounded("token issuance", self.tokens.issue(&channel, uid))
            .await?;

        let events = self
            .bounded(
                "channel join",
                self.transport
                    .join(&self.config.app_id, &channel, &credential.token, uid),
            )
            .await?;

        let microphone = match self.transport.create_microphone_track().await {
            Ok(track) => track,
            Err(err) => {
                let _ = self.transport.leave().await;
                return Err(err);
            }
        };

        // The preview camera instance is published as-is; creating a second
        // capture here would leak the handle already rendered on screen.
        if let Err(err) = self
            .bounded(
                "publish",
                self.transport
                    .publish(vec![microphone.clone(), camera.clone()]),
            )
            .await
        {
            // A failed publish leaves the channel in an unknown state; leave
            // before any retry to avoid a duplicate publish.
            microphone.stop().await;
            let _ = self.transport.leave().await;
            return Err(err);
        }

        let session_id = match self
            .store
            .create_session(NewLiveSession {
                title: title.clone(),
                host_uid: uid,
                agora_channel: channel.clone(),
                agora_token: credential.token.clone(),
            })
            .await
        {
            Ok(id) => id,
            Err(err) => {
                microphone.stop().await;
                let _ = self.transport.leave().await;
                return Err(err);
            }
        };

        let feed = match self.store.subscribe_waiting_room(&session_id).await {
            Ok(feed) => feed,
            Err(err) => {
                // The record already exists; close it out rather than leave
                // a live orphan behind.
                let _ = self.store.end_session(&session_id).await;
                microphone.stop().await;
                let _ = self.transport.leave().await;
                return Err(err);
            }
        };

        self.elapsed_secs.store(0, Ordering::SeqCst);
        self.viewer_count.store(0, Ordering::SeqCst);
        *write_view(&self.waiting_room) = WaitingRoomView::default();

        let feed_task = {
            let waiting_room = Arc::clone(&self.waiting_room);
            let mut feed = feed;
            tokio::spawn(async move {
                while let Some(snapshot) = feed.recv().await {
                    let view = WaitingRoomView::project(&snapshot);
                    debug!(
                        waiting = view.waiting_count(),
                        completed = view.completed_count(),
                        "waiting-room snapshot applied"
                    );
                    *write_view(&waiting_room) = view;
                }
            })
        };
        let viewer_task = {
            let viewers = Arc::clone(&self.viewer_count);
            let mut events = events;
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        TransportEvent::ViewerJoined => {
                            viewers.fetch_add(1, Ordering::SeqCst);
                        }
                        TransportEvent::ViewerLeft => {
                            let _ = viewers
                                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                                    Some(v.saturating_sub(1))
                                });
                        }
                    }
                }
            })
        };
        let timer_task = {
            let elapsed = Arc::clone(&self.elapsed_secs);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(1));
                // The first tick completes immediately; the counter must
                // read 0 right after entering live.
                interval.tick().await;
                loop {
                    interval.tick().await;
                    elapsed.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        {
            let mut state = self.lock_state();
            state.tracks.set_microphone(microphone);
            state.session_id = Some(session_id.clone());
            state.feed_task = Some(feed_task);
            state.viewer_task = Some(viewer_task);
            state.timer_task = Some(timer_task);
            state.phase = Phase::Live;
        }
        info!(session = %session_id, %channel, uid, "broadcast is live");

        // Move the camera render to the live surface once it is mounted.
        // The broadcast itself is already up; a render hiccup is logged,
        // not fatal.
        self.surfaces.live.ready().await;
        if let Err(err) = camera.play(LIVE_SURFACE).await {
            warn!(error = %err, "failed to render into live surface");
        }
        Ok(())
    }

    /// `live -> ending -> setup`: cancels background work, marks the record
    /// ended, releases both captures, leaves the channel, resets transient
    /// counters, and regenerates the default channel name. Teardown always
    /// runs to completion; the first failure encountered is returned after
    /// local cleanup finishes.
    pub async fn end_session(&self) -> Result<(), LiveError> {
        let _guard = self.begin_command()?;
        let (session_id, camera, microphone) = {
            let mut state = self.lock_state();
            if state.phase != Phase::Live {
                return Err(LiveError::InvalidCommand(format!(
                    "no session to end while {}",
                    state.phase
                )));
            }
            state.phase = Phase::Ending;
            // Dropping the feed receiver inside the aborted task is the
            // unsubscribe.
            for task in [
                state.feed_task.take(),
                state.viewer_task.take(),
                state.timer_task.take(),
            ]
            .into_iter()
            .flatten()
            {
                task.abort();
            }
            (
                state.session_id.take(),
                state.tracks.take_camera(),
                state.tracks.take_microphone(),
            )
        };

        let mut first_failure = Ok(());
        if let Some(id) = session_id.as_ref() {
            if let Err(err) = self.store.end_session(id).await {
                warn!(session = %id, error = %err, "failed to mark session ended");
                first_failure = Err(err);
            }
        }

        release(camera).await;
        release(microphone).await;
        if let Err(err) = self.transport.leave().await {
            warn!(error = %err, "failed to leave channel cleanly");
            if first_failure.is_ok() {
                first_failure = Err(err);
            }
        }

        self.elapsed_secs.store(0, Ordering::SeqCst);
        self.viewer_count.store(0, Ordering::SeqCst);
        *write_view(&self.waiting_room) = WaitingRoomView::default();

        {
            let mut state = self.lock_state();
            state.mic_muted = false;
            state.camera_off = false;
            state.channel_name = generate_channel_name();
            state.phase = Phase::Setup;
        }
        if let Some(id) = session_id {
            info!(session = %id, "session ended");
        }
        first_failure
    }

    /// Signing out mid-broadcast runs the normal end-session path first.
    pub async fn sign_out(&self) -> Result<(), LiveError> {
        if self.phase() == Phase::Live {
            self.end_session().await
        } else {
            Ok(())
        }
    }

    // ---- live controls --------------------------------------------------

    /// Flips the microphone. Returns the new muted flag.
    pub async fn toggle_microphone(&self) -> Result<bool, LiveError> {
        let _guard = self.begin_command()?;
        let (track, muted) = {
            let state = self.lock_state();
            if state.phase != Phase::Live {
                return Err(LiveError::InvalidCommand(format!(
                    "microphone toggle only applies while live, not {}",
                    state.phase
                )));
            }
            let track = state.tracks.microphone().ok_or_else(|| {
                LiveError::InvalidCommand("microphone capture is missing".to_string())
            })?;
            (track, state.mic_muted)
        };
        track.set_enabled(muted).await?;
        let mut state = self.lock_state();
        state.mic_muted = !muted;
        Ok(state.mic_muted)
    }

    /// Pauses or resumes the camera. Returns the new paused flag.
    pub async fn toggle_camera(&self) -> Result<bool, LiveError> {
        let _guard = self.begin_command()?;
        let (track, off) = {
            let state = self.lock_state();
            if state.phase != Phase::Live {
                return Err(LiveError::InvalidCommand(format!(
                    "camera toggle only applies while live, not {}",
                    state.phase
                )));
            }
            let track = state.tracks.camera().ok_or_else(|| {
                LiveError::InvalidCommand("camera capture is missing".to_string())
            })?;
            (track, state.camera_off)
        };
        track.set_enabled(off).await?;
        let mut state = self.lock_state();
        state.camera_off = !off;
        Ok(state.camera_off)
    }

    // ---- admission commands ---------------------------------------------

    /// Admits a waiting entry to a private consultation. If another entry is
    /// in session it is written to `done` first, and that write is awaited
    /// before the target's, so two entries can never read as in-session.
    pub async fn admit(&self, entry_id: &EntryId) -> Result<(), LiveError> {
        let _guard = self.begin_command()?;
        let session_id = self.live_session_id("admit")?;
        let view = self.waiting_room();
        let target = view
            .queue
            .iter()
            .find(|e| &e.id == entry_id)
            .ok_or_else(|| {
                LiveError::InvalidCommand(format!("unknown waiting-room entry {entry_id}"))
            })?;
        if target.status != EntryStatus::Waiting {
            return Err(LiveError::InvalidCommand(format!(
                "{} is not waiting",
                target.user_name
            )));
        }

        if let Some(current) = view.current.as_ref().filter(|c| &c.id != entry_id) {
            self.store
                .set_entry_status(&session_id, &current.id, EntryStatus::Done)
                .await?;
        }
        self.store
            .set_entry_status(&session_id, entry_id, EntryStatus::InSession)
            .await?;
        self.store.set_in_consultation(&session_id, true).await?;
        info!(session = %session_id, entry = %entry_id, user = %target.user_name, "admitted to consultation");
        Ok(())
    }

    /// Concludes the active consultation. A no-op with no writes when
    /// nothing is in session.
    pub async fn end_consultation(&self) -> Result<(), LiveError> {
        let _guard = self.begin_command()?;
        let session_id = self.live_session_id("end consultation")?;
        let Some(current) = self.waiting_room().current else {
            return Ok(());
        };
        self.store
            .set_entry_status(&session_id, &current.id, EntryStatus::Done)
            .await?;
        self.store.set_in_consultation(&session_id, false).await?;
        info!(session = %session_id, entry = %current.id, "consultation ended");
        Ok(())
    }

    // ---- internals ------------------------------------------------------

    fn lock_state(&self) -> MutexGuard<'_, State> {
        // Never held across an await point.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_command(&self) -> Result<CommandGuard<'_>, LiveError> {
        if self
            .command_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LiveError::CommandInFlight);
        }
        Ok(CommandGuard(&self.command_in_flight))
    }

    fn live_session_id(&self, command: &str) -> Result<SessionId, LiveError> {
        let state = self.lock_state();
        if state.phase != Phase::Live {
            return Err(LiveError::InvalidCommand(format!(
                "cannot {command} while {}",
                state.phase
            )));
        }
        state
            .session_id
            .clone()
            .ok_or_else(|| LiveError::InvalidCommand("no active session".to_string()))
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, LiveError>>,
    ) -> Result<T, LiveError> {
        match tokio::time::timeout(self.config.network_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(LiveError::Timeout { operation }),
        }
    }
}

impl Drop for LiveOrchestrator {
    fn drop(&mut self) {
        let mut state = self.lock_state();
        for task in [
            state.feed_task.take(),
            state.viewer_task.take(),
            state.timer_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }
}

fn write_view(view: &RwLock<WaitingRoomView>) -> std::sync::RwLockWriteGuard<'_, WaitingRoomView> {
    view.write().unwrap_or_else(|e| e.into_inner())
}
