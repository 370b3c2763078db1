//! Switch metrics and observability.
//!
//! Counters for dictionary retrieval, cache use and switch outcomes. Each
//! switcher owns its own `SwitchMetrics`; nothing here is global.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct SwitchMetrics {
    /// Dictionary requests sent to the translations endpoint
    dictionary_fetches: AtomicUsize,

    /// Dictionary requests that ended in the fallback dictionary
    fetch_failures: AtomicUsize,

    /// Toggles whose target dictionary was already cached
    cache_hits: AtomicUsize,

    /// Toggles that had to fetch the target dictionary
    cache_misses: AtomicUsize,

    switches: AtomicUsize,
    failed_switches: AtomicUsize,

    /// Toggles dropped because another switch was in progress
    skipped_toggles: AtomicUsize,

    sync_failures: AtomicUsize,
}

impl SwitchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&self) {
        self.dictionary_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_switch(&self) {
        self.switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_switch(&self) {
        self.failed_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_toggle(&self) {
        self.skipped_toggles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_failure(&self) {
        self.sync_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let fetches = self.dictionary_fetches.load(Ordering::Relaxed);
        let failures = self.fetch_failures.load(Ordering::Relaxed);
        let fetch_success_rate = if fetches > 0 {
            (fetches.saturating_sub(failures) as f64 / fetches as f64) * 100.0
        } else {
            0.0
        };

        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            dictionary_fetches: fetches,
            fetch_failures: failures,
            fetch_success_rate,
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            switches: self.switches.load(Ordering::Relaxed),
            failed_switches: self.failed_switches.load(Ordering::Relaxed),
            skipped_toggles: self.skipped_toggles.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the switch counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub dictionary_fetches: usize,
    pub fetch_failures: usize,

    /// Percentage (0-100) of fetches that produced a usable dictionary
    pub fetch_success_rate: f64,

    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Percentage (0-100)
    pub cache_hit_rate: f64,

    pub switches: usize,
    pub failed_switches: usize,
    pub skipped_toggles: usize,
    pub sync_failures: usize,
}
