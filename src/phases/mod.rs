use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::snapshot::PageSnapshot;
use crate::llm::inference::TextInference;
use crate::net::http::WebClient;
use crate::net::pagespeed::PageSpeedApi;
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

pub mod analytics;
pub mod content;
pub mod domain;
pub mod monitoring;
pub mod performance;
pub mod security;
pub mod seo;
pub mod signatures;
pub mod social;

// ============================================================================
// Phase identity
// ============================================================================

/// The eight readiness checks, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Domain,
    Seo,
    Performance,
    Security,
    Analytics,
    Social,
    Content,
    Monitoring,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Domain,
        Phase::Seo,
        Phase::Performance,
        Phase::Security,
        Phase::Analytics,
        Phase::Social,
        Phase::Content,
        Phase::Monitoring,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Domain => "Domain",
            Phase::Seo => "SEO",
            Phase::Performance => "Performance",
            Phase::Security => "Security",
            Phase::Analytics => "Analytics",
            Phase::Social => "Social",
            Phase::Content => "Content",
            Phase::Monitoring => "Monitoring",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Phase::Domain => "HTTPS, hostname and www configuration",
            Phase::Seo => "title, meta description, Open Graph and keywords",
            Phase::Performance => "Lighthouse metrics or page weight heuristics",
            Phase::Security => "HTTPS and security response headers",
            Phase::Analytics => "analytics and product analytics tools",
            Phase::Social => "social profiles, cards and share widgets",
            Phase::Content => "copy quality, calls to action and social proof",
            Phase::Monitoring => "error tracking, session replay, APM, robots.txt and sitemap",
        }
    }

    pub fn from_name(name: &str) -> Option<Phase> {
        Phase::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Default scorer for this phase.
    pub fn scorer(self) -> Arc<dyn PhaseScorer> {
        match self {
            Phase::Domain => Arc::new(domain::DomainPhase),
            Phase::Seo => Arc::new(seo::SeoPhase),
            Phase::Performance => Arc::new(performance::PerformancePhase),
            Phase::Security => Arc::new(security::SecurityPhase),
            Phase::Analytics => Arc::new(analytics::AnalyticsPhase),
            Phase::Social => Arc::new(social::SocialPhase),
            Phase::Content => Arc::new(content::ContentPhase),
            Phase::Monitoring => Arc::new(monitoring::MonitoringPhase),
        }
    }
}

/// All eight default scorers in report order.
pub fn default_scorers() -> Vec<Arc<dyn PhaseScorer>> {
    Phase::ALL.into_iter().map(Phase::scorer).collect()
}

// ============================================================================
// Scoring contract
// ============================================================================

/// Time budget of every outbound call a scan makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub navigation: Duration,
    pub pagespeed: Duration,
    pub headers: Duration,
    pub robots: Duration,
    pub llm: Duration,
    /// Upper bound on a whole phase, enforced by the scanner
    pub phase: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(10),
            pagespeed: Duration::from_secs(30),
            headers: Duration::from_secs(10),
            robots: Duration::from_secs(5),
            llm: Duration::from_secs(15),
            phase: Duration::from_secs(60),
        }
    }
}

/// External services a phase may call. Optional services are `None` when
/// their API key is not configured.
#[derive(Clone)]
pub struct ScanServices {
    pub web: Arc<dyn WebClient>,
    pub pagespeed: Option<Arc<dyn PageSpeedApi>>,
    pub llm: Option<Arc<dyn TextInference>>,
    pub timeouts: Timeouts,
}

/// Read-only input shared by every phase of one scan.
pub struct PhaseContext {
    pub url: String,
    pub snapshot: PageSnapshot,
    pub services: ScanServices,
}

/// One readiness check.
///
/// `score` must not fail or block indefinitely: network problems degrade to
/// a lower score plus a finding explaining why.
pub trait PhaseScorer: Send + Sync {
    fn phase(&self) -> Phase;
    fn score(&self, ctx: &PhaseContext) -> PhaseResult;
}

/// Result for a snapshot-dependent phase when the page could not be loaded.
pub fn unloaded_result(phase: Phase, snapshot: &PageSnapshot) -> PhaseResult {
    PhaseResult::new(
        phase.name(),
        0,
        vec![Finding::error("Could not load page").with_details(snapshot.error_details())],
        vec![],
    )
}

/// Accumulates points, findings and recommendations for one phase.
#[derive(Debug, Default)]
pub(crate) struct Scorecard {
    pub score: u32,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

impl Scorecard {
    pub fn award(&mut self, points: u32, finding: Finding) {
        self.score += points;
        self.findings.push(finding);
    }

    pub fn note(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn recommend(&mut self, recommendation: Recommendation) {
        self.recommendations.push(recommendation);
    }

    pub fn finish(self, phase: Phase) -> PhaseResult {
        PhaseResult::new(phase.name(), self.score, self.findings, self.recommendations)
    }
}
