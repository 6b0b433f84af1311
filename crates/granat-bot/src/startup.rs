//! Process wiring: builds the component graph from [`Cli`] and runs the
//! selected ingress strategy until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use granat_catalog::{CatalogCache, CatalogSearch, HttpCatalogSource};
use granat_session::InMemorySessionStore;
use granat_telegram::{
    run_webhook_ingress, ChatEventHandler, TelegramApiClient, TelegramPoller,
    TelegramReplyDispatcher,
};

use crate::bot_config::Cli;
use crate::bot_runtime::BotChatHandler;
use crate::conversation_router::ConversationRouter;

/// Fully wired bot ready to be attached to an ingress strategy.
pub struct BotRuntime {
    pub client: Arc<TelegramApiClient>,
    pub handler: Arc<dyn ChatEventHandler>,
    pub cache: Arc<CatalogCache>,
}

pub fn build_bot_runtime(cli: &Cli) -> Result<BotRuntime> {
    cli.validate()?;

    let source = HttpCatalogSource::new(cli.catalog_source_config())
        .context("failed to build catalog http client")?;
    let cache = Arc::new(CatalogCache::new(Arc::new(source), cli.catalog_ttl()));
    let client = Arc::new(
        TelegramApiClient::new(cli.telegram_client_config())
            .context("failed to build telegram api client")?,
    );

    let router = ConversationRouter::new(
        Arc::new(InMemorySessionStore::new()),
        CatalogSearch::new(cache.clone()),
        cli.search_result_cap,
    );
    let dispatcher = Arc::new(TelegramReplyDispatcher::new(client.clone()));
    let handler: Arc<dyn ChatEventHandler> = Arc::new(BotChatHandler::new(router, dispatcher));

    Ok(BotRuntime {
        client,
        handler,
        cache,
    })
}

pub async fn run_bot(cli: Cli) -> Result<()> {
    let runtime = build_bot_runtime(&cli)?;
    tracing::info!(
        ingress_mode = ?cli.ingress_mode,
        catalog_url = cli.catalog_url.as_str(),
        catalog_ttl_secs = cli.catalog_ttl_secs,
        "granat bot starting"
    );

    // Warm the catalog snapshot.
    let snapshot = runtime.cache.get().await;
    if snapshot.is_empty() {
        tracing::warn!("catalog unavailable at startup; searches return no results until it loads");
    }

    if cli.ingress_mode.is_webhook() {
        run_webhook_ingress(cli.webhook_config(), runtime.handler).await
    } else {
        let totals = TelegramPoller::new(runtime.client, runtime.handler, cli.poller_config())
            .run()
            .await;
        tracing::info!(
            cycles = totals.cycles,
            fetch_failures = totals.fetch_failures,
            handled = totals.updates.handled,
            "telegram long-poll ingestion stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn regression_startup_refuses_missing_token() {
        let cli = Cli::try_parse_from(["granat-bot", "--bot-token", ""]).expect("cli parses");
        let error = build_bot_runtime(&cli)
            .err()
            .expect("missing token is fatal");
        assert!(error.to_string().contains("bot-token"));
    }

    #[test]
    fn functional_startup_builds_runtime_from_flags() {
        let cli = Cli::try_parse_from([
            "granat-bot",
            "--bot-token",
            "t",
            "--catalog-url",
            "http://127.0.0.1:1/components.csv",
        ])
        .expect("cli parses");
        let runtime = build_bot_runtime(&cli).expect("runtime builds");
        assert!(runtime.cache.peek().is_none());
        assert_eq!(runtime.cache.ttl(), cli.catalog_ttl());
    }
}
