//! Waiting-room reducer.
//!
//! The store delivers a full-list snapshot on every subscription callback,
//! never a diff. The view is a pure function of the latest snapshot, so
//! re-applying the same snapshot is idempotent by construction.

use crate::models::{EntryStatus, WaitingEntry};

/// Projection of one waiting-room snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitingRoomView {
    /// Entries that have not left, ordered by join time ascending
    /// (oldest first, highest admission priority).
    pub queue: Vec<WaitingEntry>,
    /// The unique in-session entry, if a consultation is active.
    pub current: Option<WaitingEntry>,
}

impl WaitingRoomView {
    /// Recomputes the view from a full snapshot.
    pub fn project(snapshot: &[WaitingEntry]) -> Self {
        let mut queue: Vec<WaitingEntry> = snapshot
            .iter()
            .filter(|e| e.status != EntryStatus::Left)
            .cloned()
            .collect();
        queue.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));

        let current = queue
            .iter()
            .find(|e| e.status == EntryStatus::InSession)
            .cloned();

        Self { queue, current }
    }

    /// Entries still waiting to be admitted, in admission order.
    pub fn waiting(&self) -> Vec<&WaitingEntry> {
        self.queue
            .iter()
            .filter(|e| e.status == EntryStatus::Waiting)
            .collect()
    }

    /// Concluded consultations; accumulates for the session's duration.
    pub fn done(&self) -> Vec<&WaitingEntry> {
        self.queue
            .iter()
            .filter(|e| e.status == EntryStatus::Done)
            .collect()
    }

    /// Pending-count badge value.
    pub fn waiting_count(&self) -> usize {
        self.waiting().len()
    }

    /// "N consultations completed" footer value.
    pub fn completed_count(&self) -> usize {
        self.done().len()
    }
}
