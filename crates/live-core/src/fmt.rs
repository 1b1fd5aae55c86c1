//! Display helpers for the console UI.

use chrono::{DateTime, Utc};

/// Formats an elapsed-seconds counter as `MM:SS`, or `H:MM:SS` past an hour.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Coarse "joined Ns/Nm/Nh ago" label for waiting-room rows.
pub fn time_ago(joined_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let s = (now - joined_at).num_seconds().max(0);
    if s < 60 {
        format!("{s}s ago")
    } else if s < 3600 {
        format!("{}m ago", s / 60)
    } else {
        format!("{}h ago", s / 3600)
    }
}
