use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use live_token_api::{health, issue_token, AppCredentials, AppState};
use std::env;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .init();

    let app_id = env::var("AGORA_APP_ID").ok().filter(|s| !s.is_empty());
    let app_certificate = env::var("AGORA_APP_CERTIFICATE")
        .ok()
        .filter(|s| !s.is_empty());

    let credentials = match (app_id, app_certificate) {
        (Some(app_id), Some(app_certificate)) => Some(AppCredentials {
            app_id,
            app_certificate,
        }),
        _ => {
            // Serve anyway so /health works; /token reports what is missing.
            warn!("AGORA_APP_ID / AGORA_APP_CERTIFICATE not set; token requests will fail");
            None
        }
    };

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8090);
    let bind_addr = format!("{host}:{port}");

    let state = AppState { credentials };
    info!(%bind_addr, "starting token service");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .route("/token", web::get().to(issue_token))
            .route("/health", web::get().to(health))
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind on {bind_addr}"))?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
