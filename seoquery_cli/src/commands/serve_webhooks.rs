use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use clap::Args;
use serde_json::json;
use seoquery_lib::{Db, SeoQueryError, WebhookConfig, WebhookHandler, WebhookOutcome};

use super::open_db;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

#[derive(Args)]
pub struct ServeWebhooksArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,
}

#[derive(Clone)]
pub struct AppState {
    handler: Arc<WebhookHandler>,
    db: Arc<Mutex<Db>>,
}

impl AppState {
    pub fn new(handler: WebhookHandler, db: Db) -> Self {
        Self {
            handler: Arc::new(handler),
            db: Arc::new(Mutex::new(db)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/stripe", post(stripe_webhook))
        .with_state(state)
}

pub async fn run(args: &ServeWebhooksArgs) -> Result<()> {
    let handler = WebhookConfig::from_env()?.handler()?;
    let db = open_db()?;
    let app = router(AppState::new(handler, db));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("could not bind {}", args.bind))?;
    tracing::info!("listening for billing webhooks on {}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn stripe_webhook(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let now = chrono::Utc::now().timestamp();

    let result = match app.db.lock() {
        Ok(db) => app.handler.handle(&db, &body, signature, now),
        Err(_) => {
            tracing::error!("database lock poisoned");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "database unavailable"})),
            )
                .into_response();
        }
    };

    match result {
        Ok(WebhookOutcome::Updated { .. }) | Ok(WebhookOutcome::Ignored(_)) => {
            (StatusCode::OK, Json(json!({"received": true}))).into_response()
        }
        Err(SeoQueryError::Billing(e)) => {
            let status = if e.is_configuration() {
                tracing::error!("webhook not applied: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                tracing::warn!("rejected webhook: {}", e);
                StatusCode::BAD_REQUEST
            };
            (status, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(e) => {
            tracing::error!("webhook processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal error"})),
            )
                .into_response()
        }
    }
}
