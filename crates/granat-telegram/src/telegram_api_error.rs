use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failure of one Bot API call.
pub enum TelegramApiError {
    #[error("telegram {method} transport error: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("telegram {method} failed with status {status}: {description}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        description: String,
    },
    #[error("telegram {method} rejected: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },
    #[error("telegram {method} response decode error: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl TelegramApiError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "telegram_transport_error",
            Self::HttpStatus { status, .. } => classify_http_status(*status).0,
            Self::Rejected { .. } => "telegram_request_rejected",
            Self::Decode { .. } => "telegram_response_decode_failed",
        }
    }

    /// True when repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => classify_http_status(*status).1,
            Self::Rejected { .. } | Self::Decode { .. } => false,
        }
    }
}

fn classify_http_status(status: u16) -> (&'static str, bool) {
    let Ok(status) = StatusCode::from_u16(status) else {
        return ("telegram_unknown_http_failure", true);
    };
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ("telegram_auth_failed", false);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ("telegram_rate_limited", true);
    }
    if status.is_server_error() {
        return ("telegram_provider_unavailable", true);
    }
    if status.is_client_error() {
        return ("telegram_request_rejected", false);
    }
    ("telegram_unknown_http_failure", true)
}
