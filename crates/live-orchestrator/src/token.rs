//! Channel credential acquisition.

use async_trait::async_trait;
use live_core::LiveError;
use serde::Deserialize;

/// A time-limited credential authorizing a transport join for one channel
/// and one numeric identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCredential {
    pub token: String,
    pub uid: u32,
    pub channel_name: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, channel: &str, uid: u32) -> Result<ChannelCredential, LiveError>;
}

/// Token issuer backed by the console's token endpoint
/// (`GET /token?channel=<name>&uid=<int>`).
pub struct HttpTokenIssuer {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTokenIssuer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, channel: &str, uid: u32) -> Result<ChannelCredential, LiveError> {
        let url = format!("{}/token", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("channel", channel), ("uid", &uid.to_string())])
            .send()
            .await
            .map_err(|e| LiveError::CredentialError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // Surface the endpoint's own message verbatim when it sends one.
            let message = match response.json::<TokenErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("token endpoint returned {status}"),
            };
            return Err(LiveError::CredentialError(message));
        }

        response
            .json::<ChannelCredential>()
            .await
            .map_err(|e| LiveError::CredentialError(e.to_string()))
    }
}
