//! Eviction of superseded versions
//!
//! The policy is a pure function over a snapshot of the cache root; the
//! sweep applies it and never fails the fetch that triggered it.

use crate::cache::layout::{remove_item, CacheItem, CacheRoot};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Versions to delete when `current` is requested: everything strictly older.
pub fn versions_to_evict(present: impl IntoIterator<Item = u64>, current: u64) -> BTreeSet<u64> {
    present.into_iter().filter(|v| *v < current).collect()
}

/// Items from a snapshot that belong to evicted versions
pub fn plan_eviction(items: &[CacheItem], current: u64) -> Vec<CacheItem> {
    let doomed = versions_to_evict(items.iter().map(|i| i.version), current);
    items
        .iter()
        .filter(|i| doomed.contains(&i.version))
        .cloned()
        .collect()
}

/// Outcome of one eviction sweep
#[derive(Debug, Default)]
pub struct EvictionReport {
    /// Items deleted
    pub removed: Vec<CacheItem>,
    /// Items that could not be deleted, with the reason
    pub failed: Vec<(CacheItem, String)>,
}

impl EvictionReport {
    /// Whether every planned deletion succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete every item older than `current` under `root`.
///
/// Best effort: scan and delete failures are logged and recorded in the
/// report, never returned as errors.
pub async fn sweep(root: &CacheRoot, current: u64) -> EvictionReport {
    match root.scan().await {
        Ok(items) => evict(plan_eviction(&items, current)).await,
        Err(e) => {
            warn!("Skipping eviction, could not scan {}: {}", root.path().display(), e);
            EvictionReport::default()
        }
    }
}

/// Delete planned items one by one, carrying on past failures
pub async fn evict(plan: Vec<CacheItem>) -> EvictionReport {
    let mut report = EvictionReport::default();

    for item in plan {
        match remove_item(&item).await {
            Ok(()) => {
                debug!("Evicted {} v{}: {}", item.kind, item.version, item.path.display());
                report.removed.push(item);
            }
            Err(e) => {
                warn!("Failed to evict {}: {}", item.path.display(), e);
                report.failed.push((item, e.to_string()));
            }
        }
    }

    report
}
