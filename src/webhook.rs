//! Webhook server: receives Telegram updates over HTTP.
//!
//! Exposes `POST /webhook` for Telegram and `GET /health` for the platform
//! health check. When a webhook secret is configured, requests must carry
//! the matching secret-token header or they are rejected unprocessed.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::lookup::LookupService;
use crate::security::constant_time_compare;
use crate::state::ChatPreferences;
use crate::telegram::{self, Update};

const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Shared handles for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub prefs: Arc<ChatPreferences>,
    pub lookup: Arc<LookupService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured port and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Webhook server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

async fn receive_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    if !state.config.telegram_webhook_secret.is_empty() {
        let presented = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !constant_time_compare(presented, &state.config.telegram_webhook_secret) {
            warn!("Rejected webhook call with bad secret token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    if let Err(e) =
        telegram::handle_update(&state.config, &state.prefs, &state.lookup, update).await
    {
        warn!("Failed to handle update: {:#}", e);
    }

    // Always acknowledge so Telegram does not redeliver a poison update
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_state(secret: &str) -> AppState {
        let config = Config {
            telegram_bot_token: "123:abc".to_string(),
            telegram_api_url: "http://127.0.0.1:9".to_string(),
            telegram_webhook_secret: secret.to_string(),
            use_polling: false,
            webhook_host: String::new(),
            port: 0,
            lookup_timeout_secs: 1,
            max_message_len: 4000,
        };

        AppState {
            config: Arc::new(config),
            prefs: Arc::new(ChatPreferences::new()),
            lookup: Arc::new(LookupService::new(Duration::from_secs(1)).unwrap()),
        }
    }

    async fn spawn_server(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let base = spawn_server(test_state("")).await;

        let response = reqwest::get(format!("{}/health", base)).await.expect("get");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.expect("body"), "OK");
    }

    #[tokio::test]
    async fn test_webhook_accepts_empty_update() {
        let base = spawn_server(test_state("")).await;

        let response = reqwest::Client::new()
            .post(format!("{}/webhook", base))
            .json(&serde_json::json!({ "update_id": 1 }))
            .send()
            .await
            .expect("post");

        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_secret() {
        let base = spawn_server(test_state("topsecret")).await;

        let response = reqwest::Client::new()
            .post(format!("{}/webhook", base))
            .json(&serde_json::json!({ "update_id": 1 }))
            .send()
            .await
            .expect("post");

        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_webhook_rejects_wrong_secret() {
        let base = spawn_server(test_state("topsecret")).await;

        let response = reqwest::Client::new()
            .post(format!("{}/webhook", base))
            .header(SECRET_TOKEN_HEADER, "nope")
            .json(&serde_json::json!({ "update_id": 1 }))
            .send()
            .await
            .expect("post");

        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_webhook_accepts_correct_secret() {
        let base = spawn_server(test_state("topsecret")).await;

        let response = reqwest::Client::new()
            .post(format!("{}/webhook", base))
            .header(SECRET_TOKEN_HEADER, "topsecret")
            .json(&serde_json::json!({ "update_id": 1 }))
            .send()
            .await
            .expect("post");

        assert_eq!(response.status().as_u16(), 200);
    }
}
