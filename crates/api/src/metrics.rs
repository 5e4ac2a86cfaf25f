use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub enum Operation {
    Score,
    Report,
    MacroRisk,
    Subjectivity,
}

#[derive(Default)]
struct OperationStats {
    count: AtomicUsize,
    total_time_us: AtomicU64,
}

impl OperationStats {
    fn record(&self, duration: Duration) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    fn avg_time_ms(&self) -> f64 {
        let total = self.total_time_us.load(Ordering::Relaxed) as f64;
        let cnt = self.count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Default)]
pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing per operation
    score: OperationStats,
    report: OperationStats,
    macro_risk: OperationStats,
    subjectivity: OperationStats,

    // Counts
    documents_extracted: AtomicUsize,
    factors_scored: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_operation(&self, operation: Operation, duration: Duration, success: bool) {
        self.record_request(success);
        self.stats(operation).record(duration);
    }

    pub fn record_documents(&self, documents: usize) {
        self.documents_extracted.fetch_add(documents, Ordering::Relaxed);
    }

    pub fn record_factors(&self, factors: usize) {
        self.factors_scored.fetch_add(factors, Ordering::Relaxed);
    }

    fn stats(&self, operation: Operation) -> &OperationStats {
        match operation {
            Operation::Score => &self.score,
            Operation::Report => &self.report,
            Operation::MacroRisk => &self.macro_risk,
            Operation::Subjectivity => &self.subjectivity,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_score_time_ms: self.score.avg_time_ms(),
            avg_report_time_ms: self.report.avg_time_ms(),
            avg_macro_risk_time_ms: self.macro_risk.avg_time_ms(),
            avg_subjectivity_time_ms: self.subjectivity.avg_time_ms(),
            documents_extracted: self.documents_extracted.load(Ordering::Relaxed),
            factors_scored: self.factors_scored.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_score_time_ms: f64,
    pub avg_report_time_ms: f64,
    pub avg_macro_risk_time_ms: f64,
    pub avg_subjectivity_time_ms: f64,
    pub documents_extracted: usize,
    pub factors_scored: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
