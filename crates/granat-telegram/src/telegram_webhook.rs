//! Push-based ingress.
//!
//! `POST <path>` checks the optional secret header, enqueues the update on a
//! bounded channel and acknowledges at once. A single worker drains the
//! channel into the [`ChatEventHandler`], skipping ids it handled recently.
//! When the queue is full the endpoint answers 503 so Telegram redelivers
//! later, possibly after newer updates.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::chat_event_handler::{deliver_update, ChatEventHandler, UpdateDelivery};
use crate::recent_update_ids::RecentUpdateIds;
use crate::telegram_contract::TelegramUpdate;
use crate::telegram_poller::PollCycleReport;

pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
pub const LIVENESS_TEXT: &str = "Bot is running.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookIngressConfig {
    pub bind: String,
    pub path: String,
    pub secret: Option<String>,
    pub queue_capacity: usize,
}

/// Shared state of the webhook routes.
pub struct WebhookState {
    path: String,
    secret: Option<String>,
    queue: mpsc::Sender<TelegramUpdate>,
}

impl WebhookState {
    pub fn new(path: &str, secret: Option<String>, queue: mpsc::Sender<TelegramUpdate>) -> Self {
        Self {
            path: path.to_string(),
            secret: secret
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            queue,
        }
    }
}

pub fn build_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(state.path.as_str(), post(handle_telegram_update))
        .route("/", get(handle_liveness))
        .route("/healthz", get(handle_health))
        .with_state(state)
}

async fn handle_liveness() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_TEXT)
}

async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status":"ok"})))
}

async fn handle_telegram_update(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    if let Some(expected_secret) = state.secret.as_deref() {
        let observed = headers
            .get(TELEGRAM_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or("");
        if observed != expected_secret {
            tracing::warn!("telegram webhook secret mismatch");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error":{"code":"auth_failed","message":"invalid telegram webhook secret"}})),
            );
        }
    }

    let update = match serde_json::from_str::<TelegramUpdate>(&body) {
        Ok(update) => update,
        Err(error) => {
            tracing::debug!(%error, "undecodable telegram webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error":{"code":"parse_failed","message":error.to_string()}})),
            );
        }
    };
    let update_id = update.update_id;
    match state.queue.try_send(update) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status":"accepted","update_id":update_id})),
        ),
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(update_id, "webhook queue full; asking telegram to redeliver");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error":{"code":"queue_full","message":"update queue is full"}})),
            )
        }
        Err(mpsc::error::TrySendError::Closed(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error":{"code":"worker_stopped","message":"update worker is not running"}})),
        ),
    }
}

/// Drains queued updates into `handler` one at a time, skipping ids the
/// worker handled recently. Ends when every sender is dropped.
pub fn spawn_webhook_worker(
    mut queue: mpsc::Receiver<TelegramUpdate>,
    handler: Arc<dyn ChatEventHandler>,
) -> JoinHandle<PollCycleReport> {
    tokio::spawn(async move {
        let mut recent = RecentUpdateIds::default();
        let mut report = PollCycleReport::default();
        while let Some(update) = queue.recv().await {
            let delivery = deliver_update(&mut recent, handler.as_ref(), &update).await;
            if delivery == UpdateDelivery::SkippedDuplicate {
                tracing::debug!(
                    update_id = update.update_id,
                    "skipping redelivered webhook update"
                );
            }
            report.record(delivery);
        }
        report
    })
}

/// Serves the webhook routes until Ctrl-C, then drains the queue.
pub async fn run_webhook_ingress(
    config: WebhookIngressConfig,
    handler: Arc<dyn ChatEventHandler>,
) -> Result<()> {
    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
    let worker = spawn_webhook_worker(receiver, handler);
    let state = Arc::new(WebhookState::new(&config.path, config.secret.clone(), sender));

    let listener = TcpListener::bind(config.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve webhook bound address")?;
    tracing::info!(
        addr = %local_addr,
        path = config.path.as_str(),
        secret_configured = config.secret.is_some(),
        "telegram webhook ingress listening"
    );

    axum::serve(listener, build_webhook_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("telegram webhook server exited unexpectedly")?;

    let report = worker.await.context("webhook worker panicked")?;
    tracing::info!(
        received = report.received,
        handled = report.handled,
        skipped_duplicates = report.skipped_duplicates,
        "telegram webhook ingress stopped"
    );
    Ok(())
}
