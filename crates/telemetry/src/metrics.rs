//! Link metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single telemetry link
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// Inbound messages queued for the frame thread
    received_count: AtomicU64,
    /// Messages accepted for publishing
    published_count: AtomicU64,
    /// Publish attempts that failed
    publish_failure_count: AtomicU64,
    /// Inbound messages dropped due to a full queue
    dropped_count: AtomicU64,
}

impl LinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get received count
    pub fn received_count(&self) -> u64 {
        self.received_count.load(Ordering::Relaxed)
    }

    /// Increment received count
    pub fn inc_received_count(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get published count
    pub fn published_count(&self) -> u64 {
        self.published_count.load(Ordering::Relaxed)
    }

    /// Increment published count
    pub fn inc_published_count(&self) {
        self.published_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get publish failure count
    pub fn publish_failure_count(&self) -> u64 {
        self.publish_failure_count.load(Ordering::Relaxed)
    }

    /// Increment publish failure count
    pub fn inc_publish_failure_count(&self) {
        self.publish_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received_count: self.received_count(),
            published_count: self.published_count(),
            publish_failure_count: self.publish_failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of link metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received_count: u64,
    pub published_count: u64,
    pub publish_failure_count: u64,
    pub dropped_count: u64,
}
