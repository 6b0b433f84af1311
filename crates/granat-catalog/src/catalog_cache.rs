//! Refresh-on-demand catalog snapshot with stale fallback.
//!
//! `get` never fails: a fresh snapshot is served as-is, an expired one
//! triggers at most one in-flight refresh per cache, and a failed refresh
//! falls back to the previous snapshot (or an empty one when nothing was
//! ever fetched). Snapshots are swapped atomically, so readers always see a
//! complete record set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use granat_core::{current_unix_timestamp_ms, is_within_ttl};
use tokio::sync::{Mutex, MutexGuard};

use crate::catalog_error::CatalogError;
use crate::catalog_record::{parse_catalog_table, CatalogRecord};
use crate::catalog_source::CatalogSource;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Immutable point-in-time copy of the full catalog.
pub struct CacheSnapshot {
    pub records: Vec<CatalogRecord>,
    pub fetched_at_unix_ms: u64,
}

impl CacheSnapshot {
    /// Snapshot served when no fetch has ever succeeded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Time-to-live cache in front of a [`CatalogSource`].
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    current: ArcSwapOption<CacheSnapshot>,
    refresh_gate: Mutex<()>,
    refresh_attempts: AtomicU64,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: ArcSwapOption::empty(),
            refresh_gate: Mutex::new(()),
            refresh_attempts: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Last successfully fetched snapshot, without triggering a refresh.
    pub fn peek(&self) -> Option<Arc<CacheSnapshot>> {
        self.current.load_full()
    }

    /// Returns the current snapshot, refreshing it when expired.
    pub async fn get(&self) -> Arc<CacheSnapshot> {
        self.get_at(current_unix_timestamp_ms()).await
    }

    /// Same as [`CatalogCache::get`] with an explicit clock reading.
    pub async fn get_at(&self, now_unix_ms: u64) -> Arc<CacheSnapshot> {
        if let Some(snapshot) = self.fresh_snapshot(now_unix_ms) {
            return snapshot;
        }

        match self.refresh_gate.try_lock() {
            Ok(gate) => self.refresh_with_gate(now_unix_ms, gate).await,
            Err(_) => {
                // Someone else is refreshing. Stale data beats waiting.
                if let Some(stale) = self.current.load_full() {
                    tracing::debug!("catalog refresh in flight; serving stale snapshot");
                    return stale;
                }
                let observed_attempts = self.refresh_attempts.load(Ordering::Acquire);
                let gate = self.refresh_gate.lock().await;
                if self.refresh_attempts.load(Ordering::Acquire) != observed_attempts {
                    // The refresh we waited on already spent this call's round-trip.
                    return self.snapshot_or_empty();
                }
                self.refresh_with_gate(now_unix_ms, gate).await
            }
        }
    }

    fn fresh_snapshot(&self, now_unix_ms: u64) -> Option<Arc<CacheSnapshot>> {
        self.current
            .load_full()
            .filter(|snapshot| is_within_ttl(snapshot.fetched_at_unix_ms, now_unix_ms, self.ttl))
    }

    fn snapshot_or_empty(&self) -> Arc<CacheSnapshot> {
        self.current
            .load_full()
            .unwrap_or_else(|| Arc::new(CacheSnapshot::empty()))
    }

    async fn refresh_with_gate(
        &self,
        now_unix_ms: u64,
        _gate: MutexGuard<'_, ()>,
    ) -> Arc<CacheSnapshot> {
        if let Some(snapshot) = self.fresh_snapshot(now_unix_ms) {
            return snapshot;
        }

        let started = Instant::now();
        let outcome = self.fetch_records().await;
        self.refresh_attempts.fetch_add(1, Ordering::AcqRel);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(records) => {
                tracing::info!(
                    source = self.source.location(),
                    records = records.len(),
                    elapsed_ms,
                    "catalog refreshed"
                );
                let snapshot = Arc::new(CacheSnapshot {
                    records,
                    fetched_at_unix_ms: now_unix_ms,
                });
                self.current.store(Some(snapshot.clone()));
                snapshot
            }
            Err(error) => match self.current.load_full() {
                Some(previous) => {
                    tracing::warn!(
                        source = self.source.location(),
                        reason_code = error.reason_code(),
                        %error,
                        stale_fetched_at_unix_ms = previous.fetched_at_unix_ms,
                        "catalog refresh failed; serving stale snapshot"
                    );
                    previous
                }
                None => {
                    tracing::warn!(
                        source = self.source.location(),
                        reason_code = error.reason_code(),
                        %error,
                        "catalog refresh failed and no snapshot exists; serving empty catalog"
                    );
                    Arc::new(CacheSnapshot::empty())
                }
            },
        }
    }

    async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let raw = self.source.fetch_table().await?;
        let records = parse_catalog_table(&raw)?;
        if records.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;

    const TABLE_V1: &str = "Component,File,Tags,Link\nButton,App Components,кнопка,L1\n";
    const TABLE_V2: &str = "Component,File,Tags,Link\nButton,App Components,кнопка,L1\nHeader,Web,шапка,L2\n";
    const TTL: Duration = Duration::from_secs(120);

    #[derive(Default)]
    struct ScriptedSource {
        responses: StdMutex<VecDeque<Result<String, CatalogError>>>,
        fetches: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<String, CatalogError>>) -> Self {
            Self {
                responses: StdMutex::new(responses.into()),
                ..Self::default()
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogSource for ScriptedSource {
        fn location(&self) -> &str {
            "scripted"
        }

        async fn fetch_table(&self) -> Result<String, CatalogError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or(Err(CatalogError::EmptyCatalog))
        }
    }

    fn unavailable() -> Result<String, CatalogError> {
        Err(CatalogError::HttpStatus {
            url: "scripted".to_string(),
            status: 503,
        })
    }

    #[tokio::test]
    async fn unit_get_within_ttl_returns_identical_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(TABLE_V1.to_string())]));
        let cache = CatalogCache::new(source.clone(), TTL);

        let first = cache.get_at(1_000).await;
        let second = cache.get_at(1_000 + 119_999).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.fetched_at_unix_ms, second.fetched_at_unix_ms);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn functional_expired_snapshot_is_replaced_on_next_get() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(TABLE_V1.to_string()),
            Ok(TABLE_V2.to_string()),
        ]));
        let cache = CatalogCache::new(source.clone(), TTL);

        let first = cache.get_at(1_000).await;
        let refreshed = cache.get_at(1_000 + 120_000).await;
        assert_eq!(first.records.len(), 1);
        assert_eq!(refreshed.records.len(), 2);
        assert_eq!(refreshed.fetched_at_unix_ms, 121_000);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn functional_failed_refresh_serves_previous_snapshot_unchanged() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(TABLE_V1.to_string()),
            unavailable(),
        ]));
        let cache = CatalogCache::new(source.clone(), TTL);

        let first = cache.get_at(1_000).await;
        let stale = cache.get_at(500_000).await;
        assert!(Arc::ptr_eq(&first, &stale));
        assert_eq!(stale.fetched_at_unix_ms, 1_000);
        assert_eq!(stale.records.len(), 1);
    }

    #[tokio::test]
    async fn functional_failure_without_prior_snapshot_returns_empty() {
        let source = Arc::new(ScriptedSource::new(vec![unavailable()]));
        let cache = CatalogCache::new(source, TTL);

        let snapshot = cache.get_at(1_000).await;
        assert!(snapshot.is_empty());
        assert!(cache.peek().is_none());
    }

    #[tokio::test]
    async fn regression_table_without_valid_rows_counts_as_failed_refresh() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(TABLE_V1.to_string()),
            Ok("Component,File,Tags,Link\n,,,\n".to_string()),
        ]));
        let cache = CatalogCache::new(source, TTL);

        cache.get_at(1_000).await;
        let after = cache.get_at(200_000).await;
        assert_eq!(after.records.len(), 1);
        assert_eq!(after.fetched_at_unix_ms, 1_000);
    }

    #[tokio::test]
    async fn regression_empty_cache_retries_fetch_on_next_call() {
        let source = Arc::new(ScriptedSource::new(vec![
            unavailable(),
            Ok(TABLE_V1.to_string()),
        ]));
        let cache = CatalogCache::new(source.clone(), TTL);

        assert!(cache.get_at(1_000).await.is_empty());
        let recovered = cache.get_at(1_001).await;
        assert_eq!(recovered.records.len(), 1);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn integration_concurrent_cold_gets_share_one_fetch() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(TABLE_V1.to_string())])
                .with_delay(Duration::from_millis(50)),
        );
        let cache = CatalogCache::new(source.clone(), TTL);

        let (left, right) = tokio::join!(cache.get_at(1_000), cache.get_at(1_000));
        assert!(Arc::ptr_eq(&left, &right));
        assert_eq!(left.records.len(), 1);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn integration_refresh_in_flight_serves_stale_to_other_callers() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(TABLE_V1.to_string()), Ok(TABLE_V2.to_string())])
                .with_delay(Duration::from_millis(50)),
        );
        let cache = CatalogCache::new(source.clone(), TTL);
        let original = cache.get_at(1_000).await;

        let (refreshed, concurrent) =
            tokio::join!(cache.get_at(300_000), cache.get_at(300_000));
        assert_eq!(refreshed.records.len(), 2);
        assert!(Arc::ptr_eq(&concurrent, &original));
        assert_eq!(source.fetches(), 2);
    }
}
