//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Transport application identifier, passed through to channel joins.
    pub app_id: String,
    /// Numeric identity the broadcaster joins with. Audience clients use
    /// their own identities; the host is always this fixed uid.
    pub host_uid: u32,
    /// Title pre-filled into a fresh session.
    pub default_title: String,
    /// Deadline applied to each network step (token fetch, channel join,
    /// publish). Expiry maps to the same recoverable error path as outright
    /// failure.
    pub network_timeout_secs: u64,
}

impl OrchestratorConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            host_uid: 1,
            default_title: "Rabbi Landau — Live Teaching".to_string(),
            network_timeout_secs: 10,
        }
    }
}
