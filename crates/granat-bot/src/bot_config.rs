use std::time::Duration;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, ValueEnum};
use granat_catalog::HttpCatalogSourceConfig;
use granat_telegram::{TelegramApiClientConfig, TelegramPollerConfig, WebhookIngressConfig};

pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/TheBugurtov/Figma-components-to-Google-Sheets/main/components.csv";
/// Upper bound Telegram accepts for the `getUpdates` timeout.
const MAX_POLL_TIMEOUT_SECS: u64 = 50;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IngressMode {
    Polling,
    Webhook,
}

impl IngressMode {
    pub fn is_webhook(self) -> bool {
        matches!(self, IngressMode::Webhook)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "granat-bot",
    about = "Telegram assistant for the Granat design-system component catalog",
    version
)]
pub struct Cli {
    #[arg(
        long = "bot-token",
        env = "GRANAT_BOT_TOKEN",
        hide_env_values = true,
        help = "Telegram bot token"
    )]
    pub bot_token: Option<String>,

    #[arg(
        long = "catalog-url",
        env = "GRANAT_CATALOG_URL",
        default_value = DEFAULT_CATALOG_URL,
        help = "URL of the component catalog CSV table"
    )]
    pub catalog_url: String,

    #[arg(
        long = "catalog-ttl-secs",
        env = "GRANAT_CATALOG_TTL_SECS",
        default_value_t = 300,
        value_parser = parse_positive_u64,
        help = "Seconds a fetched catalog snapshot stays fresh"
    )]
    pub catalog_ttl_secs: u64,

    #[arg(
        long = "catalog-timeout-ms",
        env = "GRANAT_CATALOG_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for one catalog fetch"
    )]
    pub catalog_timeout_ms: u64,

    #[arg(
        long = "telegram-api-base",
        env = "GRANAT_TELEGRAM_API_BASE",
        default_value = "https://api.telegram.org",
        help = "Base URL of the Telegram Bot API"
    )]
    pub telegram_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "GRANAT_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for Bot API requests"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "ingress-mode",
        env = "GRANAT_INGRESS_MODE",
        value_enum,
        default_value_t = IngressMode::Polling,
        help = "How updates reach the bot: long polling or webhook"
    )]
    pub ingress_mode: IngressMode,

    #[arg(
        long = "poll-timeout-secs",
        env = "GRANAT_POLL_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = parse_positive_u64,
        help = "Long-poll wait in seconds (at most 50)"
    )]
    pub poll_timeout_secs: u64,

    #[arg(
        long = "poll-retry-delay-ms",
        env = "GRANAT_POLL_RETRY_DELAY_MS",
        default_value_t = 5_000,
        value_parser = parse_positive_u64,
        help = "Delay in milliseconds before polling again after a failed fetch"
    )]
    pub poll_retry_delay_ms: u64,

    #[arg(
        long = "drop-pending-updates",
        env = "GRANAT_DROP_PENDING_UPDATES",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Skip updates queued while the bot was offline"
    )]
    pub drop_pending_updates: bool,

    #[arg(
        long = "webhook-bind",
        env = "GRANAT_WEBHOOK_BIND",
        default_value = "0.0.0.0:3000",
        help = "Listen address for webhook ingress"
    )]
    pub webhook_bind: String,

    #[arg(
        long = "webhook-path",
        env = "GRANAT_WEBHOOK_PATH",
        default_value = "/webhook",
        help = "Path Telegram posts updates to"
    )]
    pub webhook_path: String,

    #[arg(
        long = "webhook-secret",
        env = "GRANAT_WEBHOOK_SECRET",
        hide_env_values = true,
        help = "Expected x-telegram-bot-api-secret-token header value"
    )]
    pub webhook_secret: Option<String>,

    #[arg(
        long = "webhook-queue-capacity",
        env = "GRANAT_WEBHOOK_QUEUE_CAPACITY",
        default_value_t = 64,
        value_parser = parse_positive_usize,
        help = "Accepted webhook updates buffered ahead of the worker"
    )]
    pub webhook_queue_capacity: usize,

    #[arg(
        long = "search-result-cap",
        env = "GRANAT_SEARCH_RESULT_CAP",
        default_value_t = 20,
        value_parser = parse_positive_usize,
        help = "Maximum number of matches listed in one search answer"
    )]
    pub search_result_cap: usize,
}

impl Cli {
    /// Rejects combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token().is_none() {
            bail!("--bot-token (or GRANAT_BOT_TOKEN) is required");
        }
        if self.catalog_url.trim().is_empty() {
            bail!("--catalog-url cannot be empty");
        }
        if self.poll_timeout_secs > MAX_POLL_TIMEOUT_SECS {
            bail!(
                "--poll-timeout-secs must be at most {MAX_POLL_TIMEOUT_SECS}, got {}",
                self.poll_timeout_secs
            );
        }
        let path = self.webhook_path.trim();
        if !path.starts_with('/') {
            bail!("--webhook-path must start with '/', got '{path}'");
        }
        if path == "/" || path == "/healthz" {
            bail!("--webhook-path '{path}' collides with a built-in route");
        }
        Ok(())
    }

    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn catalog_source_config(&self) -> HttpCatalogSourceConfig {
        HttpCatalogSourceConfig {
            url: self.catalog_url.trim().to_string(),
            request_timeout_ms: self.catalog_timeout_ms,
        }
    }

    pub fn telegram_client_config(&self) -> TelegramApiClientConfig {
        TelegramApiClientConfig {
            api_base: self.telegram_api_base.trim().to_string(),
            bot_token: self.bot_token().unwrap_or_default().to_string(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn poller_config(&self) -> TelegramPollerConfig {
        TelegramPollerConfig {
            poll_timeout_secs: self.poll_timeout_secs,
            retry_delay_ms: self.poll_retry_delay_ms,
            drop_pending_updates: self.drop_pending_updates,
        }
    }

    pub fn webhook_config(&self) -> WebhookIngressConfig {
        WebhookIngressConfig {
            bind: self.webhook_bind.trim().to_string(),
            path: self.webhook_path.trim().to_string(),
            secret: self.webhook_secret.clone(),
            queue_capacity: self.webhook_queue_capacity,
        }
    }
}
