//! Token Issuer service.
//!
//! Mints the time-limited, channel-scoped credentials that authorize joins
//! to the broadcast transport. Broadcaster and audience clients call
//! `GET /token?channel=<name>&uid=<int>` before joining.

pub mod handlers;
pub mod token_builder;

pub use handlers::{health, issue_token, AppCredentials, AppState};

/// Token validity window: 2 hours from issuance.
pub const TOKEN_TTL_SECONDS: i64 = 7200;
