//! HTTP surface: `GET /token` and `GET /health`.

use crate::token_builder::build_publisher_token;
use crate::TOKEN_TTL_SECONDS;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

/// Signing material from the transport vendor's console.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_certificate: String,
}

#[derive(Clone)]
pub struct AppState {
    /// `None` until both env vars are configured; requests then get a 500
    /// explaining what is missing rather than an opaque failure.
    pub credentials: Option<AppCredentials>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub channel: Option<String>,
    pub uid: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub uid: u32,
    pub channel_name: String,
    /// Unix seconds.
    pub expires_at: i64,
}

pub async fn issue_token(
    state: web::Data<AppState>,
    query: web::Query<TokenQuery>,
) -> HttpResponse {
    let channel = match query.channel.as_deref().map(str::trim) {
        Some(channel) if !channel.is_empty() => channel.to_string(),
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Missing ?channel= parameter"
            }));
        }
    };
    let uid = query.uid.unwrap_or(1);

    let Some(credentials) = state.credentials.as_ref() else {
        warn!(%channel, "token requested but signing credentials are not configured");
        return HttpResponse::InternalServerError().json(json!({
            "error": "AGORA_APP_ID / AGORA_APP_CERTIFICATE are not set"
        }));
    };

    let expires_at = Utc::now().timestamp() + TOKEN_TTL_SECONDS;
    let token = build_publisher_token(
        &credentials.app_id,
        &credentials.app_certificate,
        &channel,
        uid,
        expires_at,
    );

    info!(%channel, uid, expires_at, "issued publisher token");
    HttpResponse::Ok().json(TokenResponse {
        token,
        uid,
        channel_name: channel,
        expires_at,
    })
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}
