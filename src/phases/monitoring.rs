use reqwest::Url;
use tracing::debug;

use crate::browser::snapshot::PageSnapshot;
use crate::phases::signatures::{MONITORING, ToolCategory};
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard, unloaded_result};
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

pub const ERROR_TRACKING_POINTS: u32 = 40;
pub const SESSION_REPLAY_POINTS: u32 = 20;
pub const APM_POINTS: u32 = 20;
pub const ROBOTS_POINTS: u32 = 10;
pub const SITEMAP_POINTS: u32 = 10;

/// Error tracking, session replay and APM tooling plus crawler hygiene.
pub struct MonitoringPhase;

impl PhaseScorer for MonitoringPhase {
    fn phase(&self) -> Phase {
        Phase::Monitoring
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        if !ctx.snapshot.loaded {
            return score_monitoring(&ctx.snapshot, None);
        }

        let robots = robots_url(&ctx.url).and_then(|robots_url| {
            ctx.services
                .web
                .get_text(&robots_url, ctx.services.timeouts.robots)
                .map_err(|e| debug!(url = %robots_url, error = %e, "robots.txt unavailable"))
                .ok()
        });
        score_monitoring(&ctx.snapshot, robots.as_deref())
    }
}

/// `<origin>/robots.txt` for a page URL.
pub fn robots_url(url: &str) -> Option<String> {
    let mut url = Url::parse(url).ok()?;
    url.host_str()?;
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Score a loaded snapshot; `robots` is the robots.txt body if it was fetched.
pub fn score_monitoring(snapshot: &PageSnapshot, robots: Option<&str>) -> PhaseResult {
    if !snapshot.loaded {
        let mut result = unloaded_result(Phase::Monitoring, snapshot);
        result.recommendations.push(uptime_recommendation());
        return result;
    }
    let tools = MONITORING.detect(snapshot);
    let mut card = Scorecard::default();

    for tool in &tools {
        card.note(Finding::success(format!("{} detected", tool.name)).with_details(tool.category.label()));
    }
    let has = |category: ToolCategory| tools.iter().any(|t| t.category == category);

    if tools.is_empty() {
        card.note(Finding::error("No monitoring tools detected"));
    }

    if has(ToolCategory::ErrorTracking) {
        card.score += ERROR_TRACKING_POINTS;
    } else {
        if !tools.is_empty() {
            card.note(Finding::warning("No error tracking"));
        }
        card.recommend(Recommendation::high(
            "Add error tracking",
            "Without error tracking you only learn about broken pages when users complain.",
            "Install Sentry (or Bugsnag / Rollbar) in your frontend and backend.",
        ));
    }

    if has(ToolCategory::SessionReplay) {
        card.score += SESSION_REPLAY_POINTS;
    } else {
        card.recommend(Recommendation::low(
            "Consider session replay",
            "Replays show exactly what a user did before an error or drop-off.",
            "Try LogRocket, FullStory or Microsoft Clarity.",
        ));
    }

    if has(ToolCategory::Apm) {
        card.score += APM_POINTS;
    } else {
        card.recommend(Recommendation::low(
            "Add real-user performance monitoring",
            "Lab scores miss the slow devices and networks your real users have.",
            "Enable Datadog RUM, New Relic Browser or Sentry performance monitoring.",
        ));
    }

    let robots = robots.filter(|body| !body.trim().is_empty());
    if robots.is_some() {
        card.award(ROBOTS_POINTS, Finding::success("robots.txt found"));
    }

    let sitemap_in_robots = robots.is_some_and(|body| body.to_ascii_lowercase().contains("sitemap:"));
    if sitemap_in_robots || snapshot.html.to_ascii_lowercase().contains("sitemap") {
        card.award(SITEMAP_POINTS, Finding::success("Sitemap referenced"));
    } else {
        card.note(Finding::warning("No sitemap reference found"));
        card.recommend(Recommendation::low(
            "Publish a sitemap",
            "A sitemap helps search engines discover every page.",
            "Generate sitemap.xml and reference it from robots.txt with a Sitemap: line.",
        ));
    }

    card.recommend(uptime_recommendation());
    card.finish(Phase::Monitoring)
}

/// Uptime cannot be judged from a single fetch, so this is always suggested.
pub fn uptime_recommendation() -> Recommendation {
    Recommendation::medium(
        "Set up uptime monitoring",
        "A single scan cannot tell whether your site stays up.",
        "Configure an uptime monitor (e.g. Better Stack, UptimeRobot) with alerts to your team.",
    )
}
