use live_core::{LiveError, Phase, SessionStatus};
use live_orchestrator::{HttpTokenIssuer, TransportEvent};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::support::{
    build_orchestrator, start_token_server, InMemoryStore, InMemoryTransport, StaticIssuer,
};

#[tokio::test]
async fn full_broadcast_cycle_returns_to_setup() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = build_orchestrator(transport.clone(), store.clone(), Arc::new(StaticIssuer));

    assert_eq!(orch.phase(), Phase::Setup);
    orch.set_title("Weekly Teaching").unwrap();
    let channel = orch.channel_name();

    orch.start_preview().await.unwrap();
    assert_eq!(orch.phase(), Phase::Preview);

    orch.go_live().await.unwrap();
    assert_eq!(orch.phase(), Phase::Live);
    assert_eq!(orch.elapsed_secs(), 0);

    let session_id = orch.session_id().unwrap();
    let record = store.session(&session_id).await.unwrap();
    assert_eq!(record.status, SessionStatus::Live);
    assert_eq!(record.title, "Weekly Teaching");
    assert_eq!(record.agora_channel, channel);
    assert!(!record.in_consultation);

    transport.emit(TransportEvent::ViewerJoined).await;
    transport.emit(TransportEvent::ViewerJoined).await;
    transport.emit(TransportEvent::ViewerLeft).await;
    tokio::task::yield_now().await;
    assert_eq!(orch.viewer_count(), 1);

    orch.end_session().await.unwrap();
    assert_eq!(orch.phase(), Phase::Setup);
    assert_eq!(orch.viewer_count(), 0);
    assert_eq!(orch.elapsed_secs(), 0);
    assert!(orch.session_id().is_none());
    assert_ne!(orch.channel_name(), channel);

    let record = store.session(&session_id).await.unwrap();
    assert_eq!(record.status, SessionStatus::Ended);
    assert_eq!(transport.leaves.load(Ordering::SeqCst), 1);

    // Both captures released exactly once.
    for track in transport.tracks.lock().await.iter() {
        assert_eq!(track.stops.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn preview_can_be_cancelled_and_retried() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = build_orchestrator(transport.clone(), store, Arc::new(StaticIssuer));

    orch.start_preview().await.unwrap();
    orch.cancel_preview().await.unwrap();
    assert_eq!(orch.phase(), Phase::Setup);

    orch.start_preview().await.unwrap();
    assert_eq!(orch.phase(), Phase::Preview);
    assert_eq!(transport.tracks.lock().await.len(), 2);
}

#[actix_rt::test]
async fn goes_live_against_the_real_token_service() {
    let (addr, handle) = start_token_server(true).await.expect("start token server");
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let issuer = Arc::new(HttpTokenIssuer::new(format!("http://{addr}")));
    let orch = build_orchestrator(transport.clone(), store.clone(), issuer);

    orch.start_preview().await.unwrap();
    orch.go_live().await.unwrap();
    assert_eq!(orch.phase(), Phase::Live);

    let session_id = orch.session_id().unwrap();
    let record = store.session(&session_id).await.unwrap();
    // The signed credential is persisted for audience joins.
    assert!(record.agora_token.starts_with("007"));

    orch.end_session().await.unwrap();
    handle.stop(true).await;
}

#[actix_rt::test]
async fn unconfigured_token_service_aborts_go_live() {
    let (addr, handle) = start_token_server(false).await.expect("start token server");
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let issuer = Arc::new(HttpTokenIssuer::new(format!("http://{addr}")));
    let orch = build_orchestrator(transport.clone(), store.clone(), issuer);

    orch.start_preview().await.unwrap();
    let err = orch.go_live().await.unwrap_err();
    match err {
        LiveError::CredentialError(message) => {
            assert!(message.contains("AGORA_APP_ID / AGORA_APP_CERTIFICATE"))
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(orch.phase(), Phase::Preview);
    assert!(store.sessions.lock().await.is_empty());
    handle.stop(true).await;
}
