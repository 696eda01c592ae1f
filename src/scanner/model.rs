use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Findings and recommendations produced by phase scorers
// ============================================================================

/// Severity of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Success,
    Warning,
    Error,
}

/// A single observation made by a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Finding {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::Success,
            message: message.into(),
            details: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::Warning,
            message: message.into(),
            details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::Error,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A prioritized, actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub actionable: String,
}

impl Recommendation {
    pub fn new(
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        actionable: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            title: title.into(),
            description: description.into(),
            actionable: actionable.into(),
        }
    }

    pub fn high(title: impl Into<String>, description: impl Into<String>, actionable: impl Into<String>) -> Self {
        Self::new(Priority::High, title, description, actionable)
    }

    pub fn medium(title: impl Into<String>, description: impl Into<String>, actionable: impl Into<String>) -> Self {
        Self::new(Priority::Medium, title, description, actionable)
    }

    pub fn low(title: impl Into<String>, description: impl Into<String>, actionable: impl Into<String>) -> Self {
        Self::new(Priority::Low, title, description, actionable)
    }
}

// ============================================================================
// Per-phase and whole-scan results
// ============================================================================

/// Every phase is budgeted out of the same maximum.
pub const PHASE_MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    pub phase_name: String,
    pub score: u32,
    pub max_score: u32,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

impl PhaseResult {
    /// Build a result, clamping `score` into `[0, PHASE_MAX_SCORE]`.
    pub fn new(
        phase_name: impl Into<String>,
        score: u32,
        findings: Vec<Finding>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self {
            phase_name: phase_name.into(),
            score: score.min(PHASE_MAX_SCORE),
            max_score: PHASE_MAX_SCORE,
            findings,
            recommendations,
        }
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(FindingKind::Error) > 0
    }
}

/// Aggregated outcome of one scan.
///
/// `score` is always `round(100 * Σ phase.score / Σ phase.max_score)`, see
/// [`normalize_score`]. Phases appear in the fixed order of `Phase::ALL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub url: String,
    pub score: u32,
    pub max_score: u32,
    pub phases: Vec<PhaseResult>,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_priorities: Option<Vec<String>>,
}

impl ScanResult {
    pub fn from_phases(url: &str, phases: Vec<PhaseResult>) -> Self {
        Self {
            url: url.to_string(),
            score: normalize_score(&phases),
            max_score: PHASE_MAX_SCORE,
            phases,
            scanned_at: OffsetDateTime::now_utc(),
            executive_summary: None,
            top_priorities: None,
        }
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseResult> {
        self.phases.iter().find(|p| p.phase_name == name)
    }

    /// All recommendations across phases, in phase order.
    pub fn recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.phases.iter().flat_map(|p| p.recommendations.iter())
    }
}

/// Normalize summed phase scores onto 0..=100, rounding half up.
pub fn normalize_score(phases: &[PhaseResult]) -> u32 {
    let total: u64 = phases.iter().map(|p| u64::from(p.score)).sum();
    let max_total: u64 = phases.iter().map(|p| u64::from(p.max_score)).sum();
    if max_total == 0 {
        return 0;
    }
    ((200 * total + max_total) / (2 * max_total)) as u32
}
