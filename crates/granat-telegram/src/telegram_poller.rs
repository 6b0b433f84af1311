//! Long-poll ingestion loop.
//!
//! Each cycle requests updates after the [`DeliveryCursor`], hands text
//! events to the [`ChatEventHandler`] one at a time in the order received,
//! and advances the cursor only after each handoff returns. A failed fetch
//! leaves the cursor untouched, so the next cycle asks for the same window.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::chat_event_handler::{deliver_update, ChatEventHandler, UpdateDelivery};
use crate::delivery_cursor::DeliveryCursor;
use crate::telegram_api_client::TelegramApiClient;
use crate::telegram_api_error::TelegramApiError;
use crate::telegram_contract::TelegramUpdate;

/// Offset that asks Telegram for the newest retained update only.
const NEWEST_UPDATE_OFFSET: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelegramPollerConfig {
    pub poll_timeout_secs: u64,
    pub retry_delay_ms: u64,
    pub drop_pending_updates: bool,
}

impl Default for TelegramPollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
            retry_delay_ms: 5_000,
            drop_pending_updates: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Outcome counters for a batch of delivered updates.
pub struct PollCycleReport {
    pub received: usize,
    pub handled: usize,
    pub skipped_duplicates: usize,
    pub ignored_non_text: usize,
}

impl PollCycleReport {
    pub(crate) fn record(&mut self, delivery: UpdateDelivery) {
        self.received = self.received.saturating_add(1);
        match delivery {
            UpdateDelivery::Handled => self.handled = self.handled.saturating_add(1),
            UpdateDelivery::SkippedDuplicate => {
                self.skipped_duplicates = self.skipped_duplicates.saturating_add(1)
            }
            UpdateDelivery::IgnoredNonText => {
                self.ignored_non_text = self.ignored_non_text.saturating_add(1)
            }
        }
    }

    fn absorb(&mut self, other: PollCycleReport) {
        self.received = self.received.saturating_add(other.received);
        self.handled = self.handled.saturating_add(other.handled);
        self.skipped_duplicates = self
            .skipped_duplicates
            .saturating_add(other.skipped_duplicates);
        self.ignored_non_text = self.ignored_non_text.saturating_add(other.ignored_non_text);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Totals returned when the poller stops.
pub struct PollerTotals {
    pub cycles: u64,
    pub fetch_failures: u64,
    pub updates: PollCycleReport,
}

/// Single consumer of the `getUpdates` stream.
pub struct TelegramPoller {
    client: Arc<TelegramApiClient>,
    handler: Arc<dyn ChatEventHandler>,
    config: TelegramPollerConfig,
    cursor: DeliveryCursor,
}

impl TelegramPoller {
    pub fn new(
        client: Arc<TelegramApiClient>,
        handler: Arc<dyn ChatEventHandler>,
        config: TelegramPollerConfig,
    ) -> Self {
        Self {
            client,
            handler,
            config,
            cursor: DeliveryCursor::new(),
        }
    }

    pub fn cursor(&self) -> DeliveryCursor {
        self.cursor
    }

    /// Moves the cursor past the newest retained update without handling
    /// anything. Returns the skipped update id, if any.
    pub async fn skip_pending_updates(&mut self) -> Result<Option<i64>, TelegramApiError> {
        let updates = self
            .client
            .get_updates(Some(NEWEST_UPDATE_OFFSET), 0)
            .await?;
        let newest = updates.iter().map(|update| update.update_id).max();
        if let Some(update_id) = newest {
            self.cursor.advance_past(update_id);
        }
        Ok(newest)
    }

    /// One bounded iteration: fetch, then hand off in arrival order.
    pub async fn run_poll_cycle(&mut self) -> Result<PollCycleReport, TelegramApiError> {
        let updates = self.fetch_updates().await?;
        Ok(self.deliver_batch(&updates).await)
    }

    async fn fetch_updates(&self) -> Result<Vec<TelegramUpdate>, TelegramApiError> {
        self.client
            .get_updates(self.cursor.offset(), self.config.poll_timeout_secs)
            .await
    }

    async fn deliver_batch(&mut self, updates: &[TelegramUpdate]) -> PollCycleReport {
        let mut report = PollCycleReport::default();
        for update in updates {
            let delivery = deliver_update(&mut self.cursor, self.handler.as_ref(), update).await;
            report.record(delivery);
        }
        report
    }

    /// Polls until Ctrl-C.
    pub async fn run(self) -> PollerTotals {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Polls until `shutdown` resolves.
    pub async fn run_until<F>(mut self, shutdown: F) -> PollerTotals
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let retry_delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut totals = PollerTotals::default();

        if self.config.drop_pending_updates {
            let skipped = tokio::select! {
                _ = &mut shutdown => return totals,
                skipped = self.skip_pending_updates() => skipped,
            };
            match skipped {
                Ok(Some(update_id)) => {
                    tracing::info!(skipped_through_update_id = update_id, "dropped pending updates")
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(
                    reason_code = error.reason_code(),
                    %error,
                    "failed to drop pending updates; continuing with full backlog"
                ),
            }
        }

        tracing::info!(
            poll_timeout_secs = self.config.poll_timeout_secs,
            "telegram long-poll ingestion started"
        );
        loop {
            // Only the fetch races shutdown; a fetched batch is always handed
            // off in full.
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                fetched = self.fetch_updates() => fetched,
            };
            totals.cycles = totals.cycles.saturating_add(1);
            match fetched {
                Ok(updates) => {
                    let report = self.deliver_batch(&updates).await;
                    if report.received > 0 {
                        tracing::debug!(
                            received = report.received,
                            handled = report.handled,
                            skipped_duplicates = report.skipped_duplicates,
                            ignored_non_text = report.ignored_non_text,
                            next_offset = self.cursor.offset(),
                            "poll cycle complete"
                        );
                    }
                    totals.updates.absorb(report);
                }
                Err(error) => {
                    totals.fetch_failures = totals.fetch_failures.saturating_add(1);
                    tracing::warn!(
                        reason_code = error.reason_code(),
                        %error,
                        retry_delay_ms = self.config.retry_delay_ms,
                        "getUpdates failed; retrying after backoff"
                    );
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(retry_delay) => {}
                    }
                }
            }
        }
        tracing::info!(
            cycles = totals.cycles,
            fetch_failures = totals.fetch_failures,
            handled = totals.updates.handled,
            "telegram long-poll ingestion stopped"
        );
        totals
    }
}
