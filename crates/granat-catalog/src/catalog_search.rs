//! Tag search over the cached catalog.

use std::sync::Arc;

use granat_core::normalize_text;

use crate::catalog_cache::CatalogCache;
use crate::catalog_record::{CatalogRecord, CategoryScope};

/// Returns true when any tag of `record` contains `normalized_query`.
///
/// Substring containment subsumes exact tag equality. An empty query is a
/// substring of every tag, so it matches every record that has a tag.
pub fn record_matches_query(record: &CatalogRecord, normalized_query: &str) -> bool {
    record
        .tags
        .iter()
        .any(|tag| tag.contains(normalized_query))
}

/// Filters `records` by tag query and optional category scope.
///
/// Result order is source row order.
pub fn search_records(
    records: &[CatalogRecord],
    query: &str,
    scope: Option<CategoryScope>,
) -> Vec<CatalogRecord> {
    let normalized_query = normalize_text(query);
    let scope = scope.unwrap_or(CategoryScope::Any);
    records
        .iter()
        .filter(|record| scope.admits(record))
        .filter(|record| record_matches_query(record, &normalized_query))
        .cloned()
        .collect()
}

#[derive(Clone)]
/// Search engine bound to a catalog cache.
///
/// Each call borrows the snapshot current at call time and releases it when
/// the call returns.
pub struct CatalogSearch {
    cache: Arc<CatalogCache>,
}

impl CatalogSearch {
    pub fn new(cache: Arc<CatalogCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    pub async fn search(&self, query: &str, scope: Option<CategoryScope>) -> Vec<CatalogRecord> {
        let snapshot = self.cache.get().await;
        let matches = search_records(&snapshot.records, query, scope);
        tracing::debug!(
            scope = scope.map(CategoryScope::as_str).unwrap_or("any"),
            catalog_records = snapshot.records.len(),
            matches = matches.len(),
            "catalog search"
        );
        matches
    }
}
