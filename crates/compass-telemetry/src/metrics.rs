//! Enrichment metrics collection and reporting

use compass_core::EnrichmentStatus;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ENRICHMENTS_TOTAL: &str = "compass_enrichments_total";
const FALLBACK_TOTAL: &str = "compass_fallback_total";
const ENRICH_LATENCY_US: &str = "compass_enrich_latency_us";

/// Register descriptions for the series emitted by [`EnrichmentMetrics`]
///
/// Only has an effect once a recorder is installed.
pub fn describe_metrics() {
    ::metrics::describe_counter!(
        ENRICHMENTS_TOTAL,
        "Total number of enriched evidence records by enrichment status"
    );
    ::metrics::describe_counter!(
        FALLBACK_TOTAL,
        "Total number of records handled by the fallback mapper"
    );
    ::metrics::describe_histogram!(
        ENRICH_LATENCY_US,
        ::metrics::Unit::Microseconds,
        "Enrichment latency in microseconds"
    );
}

/// Enrichment counters, cheap to clone and share between handlers
#[derive(Clone)]
pub struct EnrichmentMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    total_requests: AtomicU64,
    mapped: AtomicU64,
    unmapped: AtomicU64,
    skipped: AtomicU64,
    fallbacks: AtomicU64,
    total_latency_us: AtomicU64,
}

impl EnrichmentMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record one enrichment outcome
    pub fn record(&self, status: EnrichmentStatus, fallback: bool, latency: Duration) {
        let latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);

        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);

        let counter = match status {
            EnrichmentStatus::Success => &self.inner.mapped,
            EnrichmentStatus::Unmapped => &self.inner.unmapped,
            EnrichmentStatus::Skipped => &self.inner.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        ::metrics::counter!(ENRICHMENTS_TOTAL, "status" => status.as_str()).increment(1);
        ::metrics::histogram!(ENRICH_LATENCY_US).record(latency_us as f64);

        if fallback {
            self.inner.fallbacks.fetch_add(1, Ordering::Relaxed);
            ::metrics::counter!(FALLBACK_TOTAL).increment(1);
        }
    }

    /// Record a record that was not enriched, e.g. missing attributes
    pub fn record_skipped(&self) {
        self.record(EnrichmentStatus::Skipped, false, Duration::ZERO);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            mapped: self.inner.mapped.load(Ordering::Relaxed),
            unmapped: self.inner.unmapped.load(Ordering::Relaxed),
            skipped: self.inner.skipped.load(Ordering::Relaxed),
            fallbacks: self.inner.fallbacks.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for EnrichmentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnrichmentMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EnrichmentMetrics")
            .field(&self.snapshot())
            .finish()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub mapped: u64,
    pub unmapped: u64,
    pub skipped: u64,
    pub fallbacks: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per request
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency_us / self.total_requests
        }
    }

    /// Fraction of requests that resolved to a control
    pub fn mapped_rate(&self) -> f64 {
        self.rate(self.mapped)
    }

    /// Fraction of requests served by the fallback mapper
    pub fn fallback_rate(&self) -> f64 {
        self.rate(self.fallbacks)
    }

    fn rate(&self, count: u64) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            count as f64 / self.total_requests as f64
        }
    }
}
