use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_ingested: AtomicU64,
    ingest_failures: AtomicU64,
    summaries_generated: AtomicU64,
    summary_failures: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that was accepted into the session.
    pub fn record_ingest(&self) {
        self.documents_ingested.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected or unreadable document.
    pub fn record_ingest_failure(&self) {
        self.ingest_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a summary returned by a provider.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed summarize attempt.
    pub fn record_summary_failure(&self) {
        self.summary_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_ingested: self.documents_ingested.load(Ordering::Relaxed),
            ingest_failures: self.ingest_failures.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            summary_failures: self.summary_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents accepted since startup.
    pub documents_ingested: u64,
    /// Documents rejected during validation or extraction.
    pub ingest_failures: u64,
    /// Summaries produced since startup.
    pub summaries_generated: u64,
    /// Summarize attempts that ended in an error.
    pub summary_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_ingests_and_summaries() {
        let metrics = PipelineMetrics::new();
        metrics.record_ingest();
        metrics.record_ingest();
        metrics.record_ingest_failure();
        metrics.record_summary();
        metrics.record_summary_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_ingested, 2);
        assert_eq!(snapshot.ingest_failures, 1);
        assert_eq!(snapshot.summaries_generated, 1);
        assert_eq!(snapshot.summary_failures, 1);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.snapshot().documents_ingested, 0);
        assert_eq!(metrics.snapshot().summaries_generated, 0);
    }
}
