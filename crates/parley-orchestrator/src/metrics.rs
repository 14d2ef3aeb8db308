//! Metrics collection for research runs

use parley_domain::InterviewRecord;
use std::time::Duration;

/// Metrics collected while interviews run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Interviews spawned
    pub interviews_started: usize,

    /// Interviews that produced a section
    pub interviews_completed: usize,

    /// Interviews that ended in an error
    pub interviews_failed: usize,

    /// Transcript turns across completed interviews
    pub total_turns: usize,

    /// Documents retrieved across completed interviews
    pub context_documents: usize,

    /// Longest single interview in milliseconds
    pub slowest_interview_ms: u64,

    /// Wall time of the whole fan-out in milliseconds
    pub total_runtime_ms: u64,
}

impl RunMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interview task being spawned
    pub fn record_started(&mut self) {
        self.interviews_started += 1;
    }

    /// Record a completed interview
    pub fn record_completed(&mut self, record: &InterviewRecord, elapsed: Duration) {
        self.interviews_completed += 1;
        self.total_turns += record.transcript.len();
        self.context_documents += record.context.documents().count();
        self.observe(elapsed);
    }

    /// Record a failed interview
    pub fn record_failed(&mut self, elapsed: Duration) {
        self.interviews_failed += 1;
        self.observe(elapsed);
    }

    fn observe(&mut self, elapsed: Duration) {
        let ms = elapsed.as_millis() as u64;
        self.slowest_interview_ms = self.slowest_interview_ms.max(ms);
    }

    /// Fraction of started interviews that completed
    pub fn success_rate(&self) -> f64 {
        if self.interviews_started == 0 {
            return 0.0;
        }
        self.interviews_completed as f64 / self.interviews_started as f64
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        [
            "Run Metrics Summary".to_string(),
            "===================".to_string(),
            format!(
                "Interviews: {} started, {} completed, {} failed",
                self.interviews_started, self.interviews_completed, self.interviews_failed
            ),
            format!("Transcript turns: {}", self.total_turns),
            format!("Context documents: {}", self.context_documents),
            format!("Slowest interview: {}ms", self.slowest_interview_ms),
            format!("Total runtime: {}ms", self.total_runtime_ms),
        ]
        .join("\n")
    }
}
