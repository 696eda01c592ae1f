#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use launch_ready::browser::snapshot::PageSnapshot;
use launch_ready::llm::inference::TextInference;
use launch_ready::net::http::{ResponseHeaders, StaticWebClient};
use launch_ready::net::pagespeed::PageSpeedApi;
use launch_ready::phases::{Phase, PhaseContext, PhaseScorer, ScanServices, Timeouts};
use launch_ready::scanner::model::{Finding, PhaseResult};

pub const SITE: &str = "https://www.acme.dev";
pub const ROBOTS_URL: &str = "https://www.acme.dev/robots.txt";
pub const ROBOTS_TXT: &str = "User-agent: *\nAllow: /\nSitemap: https://www.acme.dev/sitemap.xml\n";

pub fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

/// The well-prepared landing page.
pub fn launch_ready_snapshot() -> PageSnapshot {
    PageSnapshot::from_html(fixture("launch_ready.html"))
}

pub fn bare_snapshot() -> PageSnapshot {
    PageSnapshot::from_html(fixture("bare.html"))
}

/// Every security header the Security phase looks for.
pub fn hardened_headers() -> ResponseHeaders {
    ResponseHeaders::new(200)
        .with("Strict-Transport-Security", "max-age=31536000; includeSubDomains")
        .with("X-Frame-Options", "DENY")
        .with("X-Content-Type-Options", "nosniff")
        .with("Content-Security-Policy", "default-src 'self'")
        .with("X-XSS-Protection", "1; mode=block")
        .with("Referrer-Policy", "strict-origin-when-cross-origin")
        .with("Permissions-Policy", "camera=()")
}

/// Short budgets so failing tests never hang.
pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        navigation: Duration::from_secs(1),
        pagespeed: Duration::from_secs(1),
        headers: Duration::from_secs(1),
        robots: Duration::from_secs(1),
        llm: Duration::from_secs(1),
        phase: Duration::from_secs(5),
    }
}

/// Offline services: hardened headers and a robots.txt, no PageSpeed or LLM.
pub fn offline_services() -> ScanServices {
    services_with(
        StaticWebClient::new()
            .with_headers(hardened_headers())
            .with_body(ROBOTS_URL, ROBOTS_TXT),
    )
}

pub fn services_with(web: StaticWebClient) -> ScanServices {
    ScanServices {
        web: Arc::new(web),
        pagespeed: None,
        llm: None,
        timeouts: fast_timeouts(),
    }
}

pub fn with_llm(mut services: ScanServices, llm: impl TextInference + 'static) -> ScanServices {
    services.llm = Some(Arc::new(llm));
    services
}

pub fn with_pagespeed(mut services: ScanServices, api: impl PageSpeedApi + 'static) -> ScanServices {
    services.pagespeed = Some(Arc::new(api));
    services
}

pub fn context(url: &str, snapshot: PageSnapshot, services: ScanServices) -> PhaseContext {
    PhaseContext {
        url: url.to_string(),
        snapshot,
        services,
    }
}

pub fn messages(result: &PhaseResult) -> Vec<&str> {
    result.findings.iter().map(|f| f.message.as_str()).collect()
}

// ============================================================================
// Scripted scorers for pipeline tests
// ============================================================================

/// Always returns the same score.
pub struct FixedScorer {
    pub phase: Phase,
    pub score: u32,
}

impl PhaseScorer for FixedScorer {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self, _ctx: &PhaseContext) -> PhaseResult {
        PhaseResult::new(
            self.phase.name(),
            self.score,
            vec![Finding::success("fixed")],
            vec![],
        )
    }
}

/// Sleeps past any reasonable phase budget.
pub struct SlowScorer {
    pub phase: Phase,
    pub delay: Duration,
}

impl PhaseScorer for SlowScorer {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self, _ctx: &PhaseContext) -> PhaseResult {
        std::thread::sleep(self.delay);
        PhaseResult::new(self.phase.name(), 100, vec![], vec![])
    }
}

pub struct PanickingScorer {
    pub phase: Phase,
}

impl PhaseScorer for PanickingScorer {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self, _ctx: &PhaseContext) -> PhaseResult {
        panic!("scorer exploded");
    }
}
