use live_core::{EntryId, EntryStatus, LiveError};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::support::{build_orchestrator, InMemoryStore, InMemoryTransport, StaticIssuer};

async fn bring_live(
    transport: &Arc<InMemoryTransport>,
    store: &Arc<InMemoryStore>,
) -> live_orchestrator::LiveOrchestrator {
    let orch = build_orchestrator(transport.clone(), store.clone(), Arc::new(StaticIssuer));
    orch.start_preview().await.unwrap();
    orch.go_live().await.unwrap();
    orch
}

#[tokio::test]
async fn queue_orders_by_join_time_across_snapshots() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = bring_live(&transport, &store).await;

    // Insertion order A, B, C; join order C, A, B.
    store.join_waiting_room("a", "Avi", 10).await;
    store.join_waiting_room("b", "Batya", 20).await;
    store.join_waiting_room("c", "Chaim", 0).await;
    tokio::task::yield_now().await;

    let view = orch.waiting_room();
    let order: Vec<_> = view.waiting().iter().map(|e| e.user_name.clone()).collect();
    assert_eq!(order, vec!["Chaim", "Avi", "Batya"]);
    assert_eq!(view.waiting_count(), 3);
}

#[tokio::test]
async fn admitting_a_second_entry_concludes_the_first() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = bring_live(&transport, &store).await;
    let session_id = orch.session_id().unwrap();

    store.join_waiting_room("a", "Avi", 10).await;
    store.join_waiting_room("b", "Batya", 20).await;
    store.join_waiting_room("c", "Chaim", 0).await;
    tokio::task::yield_now().await;

    orch.admit(&EntryId("c".to_string())).await.unwrap();
    tokio::task::yield_now().await;
    assert!(store.session(&session_id).await.unwrap().in_consultation);

    orch.admit(&EntryId("a".to_string())).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(store.entry_status("c").await, Some(EntryStatus::Done));
    assert_eq!(store.entry_status("a").await, Some(EntryStatus::InSession));
    assert_eq!(store.entry_status("b").await, Some(EntryStatus::Waiting));
    assert!(store.session(&session_id).await.unwrap().in_consultation);

    let view = orch.waiting_room();
    assert_eq!(view.current.clone().unwrap().id, EntryId("a".to_string()));
    assert_eq!(view.completed_count(), 1);
}

#[tokio::test]
async fn concluded_entries_are_never_re_admitted() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = bring_live(&transport, &store).await;

    store.join_waiting_room("a", "Avi", 0).await;
    tokio::task::yield_now().await;

    orch.admit(&EntryId("a".to_string())).await.unwrap();
    tokio::task::yield_now().await;
    orch.end_consultation().await.unwrap();
    tokio::task::yield_now().await;

    let err = orch.admit(&EntryId("a".to_string())).await.unwrap_err();
    assert!(matches!(err, LiveError::InvalidCommand(_)));
    assert_eq!(store.entry_status("a").await, Some(EntryStatus::Done));
}

#[tokio::test]
async fn ending_without_an_active_consultation_issues_no_writes() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = bring_live(&transport, &store).await;
    let session_id = orch.session_id().unwrap();

    store.join_waiting_room("a", "Avi", 0).await;
    tokio::task::yield_now().await;

    let before = store.entry_writes.load(Ordering::SeqCst);
    orch.end_consultation().await.unwrap();
    assert_eq!(store.entry_writes.load(Ordering::SeqCst), before);
    assert!(!store.session(&session_id).await.unwrap().in_consultation);
}

#[tokio::test]
async fn departed_members_leave_the_queue_but_history_remains() {
    let transport = InMemoryTransport::new();
    let store = InMemoryStore::new();
    let orch = bring_live(&transport, &store).await;

    store.join_waiting_room("a", "Avi", 0).await;
    store.join_waiting_room("b", "Batya", 5).await;
    tokio::task::yield_now().await;

    orch.admit(&EntryId("a".to_string())).await.unwrap();
    orch.end_consultation().await.unwrap();
    tokio::task::yield_now().await;

    // B withdraws from the audience side.
    {
        let mut entries = store.entries.lock().await;
        entries
            .iter_mut()
            .find(|e| e.id.0 == "b")
            .unwrap()
            .status = EntryStatus::Left;
    }
    store.join_waiting_room("c", "Chaim", 10).await;
    tokio::task::yield_now().await;

    let view = orch.waiting_room();
    assert_eq!(view.waiting_count(), 1);
    assert_eq!(view.completed_count(), 1);
    assert!(view.queue.iter().all(|e| e.id.0 != "b"));
}
