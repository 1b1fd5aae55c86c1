//! Publisher-token construction.
//!
//! The credential is a versioned, base64-encoded package binding the app id,
//! channel, uid, and expiry, signed with HMAC-SHA256 keyed by the app
//! certificate. The transport validates the same fields server-side, so a
//! token minted for one channel/uid pair cannot be replayed on another.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Credential format version prefix.
pub const TOKEN_VERSION: &str = "007";

/// Builds a publisher token for `channel`/`uid`, valid until `expires_at`
/// (unix seconds).
pub fn build_publisher_token(
    app_id: &str,
    app_certificate: &str,
    channel: &str,
    uid: u32,
    expires_at: i64,
) -> String {
    let message = format!("{app_id}\n{channel}\n{uid}\n{expires_at}");
    // HMAC accepts keys of any length; this cannot fail.
    let mut mac = HmacSha256::new_from_slice(app_certificate.as_bytes())
        .expect("HMAC accepts a key of any length");
    mac.update(message.as_bytes());
    let signature = mac.finalize().into_bytes();

    let body = format!("{app_id}:{uid}:{expires_at}:{}", BASE64.encode(signature));
    format!("{TOKEN_VERSION}{}", BASE64.encode(body))
}
