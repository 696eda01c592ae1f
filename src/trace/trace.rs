use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::scanner::model::{FindingKind, PhaseResult};

/// One JSONL line per phase of a scan.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub url: String,
    pub phase: String,

    pub score: u32,
    pub max_score: u32,
    pub duration_ms: u128,

    pub successes: usize,
    pub warnings: usize,
    pub errors: usize,

    pub timed_out: bool,
    pub snapshot_fingerprint: Option<String>,
}

impl TraceEvent {
    pub fn for_phase(url: &str, result: &PhaseResult, duration: Duration) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            url: url.to_string(),
            phase: result.phase_name.clone(),
            score: result.score,
            max_score: result.max_score,
            duration_ms: duration.as_millis(),
            successes: result.count(FindingKind::Success),
            warnings: result.count(FindingKind::Warning),
            errors: result.count(FindingKind::Error),
            timed_out: false,
            snapshot_fingerprint: None,
        }
    }

    pub fn with_timeout(mut self) -> Self {
        self.timed_out = true;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl ToString) -> Self {
        self.snapshot_fingerprint = Some(fingerprint.to_string());
        self
    }
}
