//! Bot API client used by the poller and the reply dispatcher.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::telegram_api_error::TelegramApiError;
use crate::telegram_contract::{OutboundMessage, TelegramApiEnvelope, TelegramUpdate};

const GET_UPDATES: &str = "getUpdates";
const SEND_MESSAGE: &str = "sendMessage";

#[derive(Debug, Clone)]
pub struct TelegramApiClientConfig {
    pub api_base: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Clone)]
/// Thin Bot API client. Each call is a single round-trip with no internal
/// retry; callers decide how to recover.
pub struct TelegramApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    request_timeout: Duration,
}

impl TelegramApiClient {
    pub fn new(config: TelegramApiClientConfig) -> Result<Self, TelegramApiError> {
        let request_timeout = Duration::from_millis(config.request_timeout_ms.max(1));
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("granat-telegram"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|source| TelegramApiError::Transport {
                method: "client_init",
                source,
            })?;
        Ok(Self {
            http,
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            bot_token: config.bot_token.trim().to_string(),
            request_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    /// Long-polls for updates with id >= `offset`.
    ///
    /// The HTTP timeout is stretched by `timeout_secs` so the server-side wait
    /// never trips the client deadline.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, TelegramApiError> {
        let mut query = vec![
            ("timeout", timeout_secs.to_string()),
            ("allowed_updates", "[\"message\"]".to_string()),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let request = self
            .http
            .get(self.method_url(GET_UPDATES))
            .query(&query)
            .timeout(self.request_timeout + Duration::from_secs(timeout_secs));
        self.call(GET_UPDATES, request).await
    }

    /// Sends one message and returns the id Telegram assigned to it.
    pub async fn send_message(&self, message: &OutboundMessage) -> Result<i64, TelegramApiError> {
        let request = self
            .http
            .post(self.method_url(SEND_MESSAGE))
            .json(&message.send_message_body());
        let sent: SentMessage = self.call(SEND_MESSAGE, request).await?;
        Ok(sent.message_id)
    }

    async fn call<T>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TelegramApiError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|source| TelegramApiError::Transport { method, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TelegramApiError::Transport { method, source })?;

        if !status.is_success() {
            let description = serde_json::from_str::<TelegramApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.description)
                .unwrap_or_else(|| truncate_for_error(&body, 256));
            return Err(TelegramApiError::HttpStatus {
                method,
                status: status.as_u16(),
                description,
            });
        }

        let envelope = serde_json::from_str::<TelegramApiEnvelope<T>>(&body)
            .map_err(|source| TelegramApiError::Decode { method, source })?;
        if !envelope.ok {
            return Err(TelegramApiError::Rejected {
                method,
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        envelope.result.ok_or_else(|| TelegramApiError::Rejected {
            method,
            description: "response missing result".to_string(),
        })
    }
}

fn truncate_for_error(raw: &str, limit: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    let mut output = trimmed.chars().take(limit).collect::<String>();
    output.push_str("...");
    output
}
