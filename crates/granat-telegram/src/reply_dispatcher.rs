//! Best-effort outbound delivery.

use std::sync::Arc;

use async_trait::async_trait;

use crate::telegram_api_client::TelegramApiClient;
use crate::telegram_contract::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Dropped { reason_code: &'static str },
}

/// Sends replies without surfacing failures to the caller.
#[async_trait]
pub trait ReplyDispatcher: Send + Sync {
    async fn dispatch(&self, message: OutboundMessage) -> DispatchOutcome;
}

#[derive(Clone)]
pub struct TelegramReplyDispatcher {
    client: Arc<TelegramApiClient>,
}

impl TelegramReplyDispatcher {
    pub fn new(client: Arc<TelegramApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReplyDispatcher for TelegramReplyDispatcher {
    async fn dispatch(&self, message: OutboundMessage) -> DispatchOutcome {
        match self.client.send_message(&message).await {
            Ok(message_id) => {
                tracing::debug!(chat_id = message.chat_id, message_id, "reply delivered");
                DispatchOutcome::Delivered
            }
            Err(error) => {
                // Not retried; the user simply misses this reply.
                tracing::warn!(
                    chat_id = message.chat_id,
                    reason_code = error.reason_code(),
                    retryable = error.is_retryable(),
                    %error,
                    "reply dispatch failed"
                );
                DispatchOutcome::Dropped {
                    reason_code: error.reason_code(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::telegram_api_client::TelegramApiClientConfig;
    use crate::telegram_contract::ParseMode;

    fn dispatcher_for(server: &MockServer) -> TelegramReplyDispatcher {
        TelegramReplyDispatcher::new(Arc::new(
            TelegramApiClient::new(TelegramApiClientConfig {
                api_base: server.base_url(),
                bot_token: "token".to_string(),
                request_timeout_ms: 2_000,
            })
            .expect("client"),
        ))
    }

    fn message() -> OutboundMessage {
        OutboundMessage {
            chat_id: 9,
            text: "Вы в главном меню:".to_string(),
            parse_mode: ParseMode::Html,
            keyboard: None,
        }
    }

    #[tokio::test]
    async fn functional_dispatch_reports_delivery() {
        let server = MockServer::start();
        let send = server.mock(|when, then| {
            when.method(POST).path("/bottoken/sendMessage");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 1}}));
        });

        let outcome = dispatcher_for(&server).dispatch(message()).await;
        assert_eq!(outcome, DispatchOutcome::Delivered);
        send.assert_calls(1);
    }

    #[tokio::test]
    async fn regression_dispatch_failure_is_absorbed_without_retry() {
        let server = MockServer::start();
        let send = server.mock(|when, then| {
            when.method(POST).path("/bottoken/sendMessage");
            then.status(502).body("bad gateway");
        });

        let outcome = dispatcher_for(&server).dispatch(message()).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped {
                reason_code: "telegram_provider_unavailable"
            }
        );
        send.assert_calls(1);
    }
}
