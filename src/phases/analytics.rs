use crate::browser::snapshot::PageSnapshot;
use crate::phases::signatures::{ANALYTICS, ToolCategory};
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard, unloaded_result};
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

pub const DETECTED_POINTS: u32 = 60;
pub const MULTIPLE_TOOLS_BONUS: u32 = 15;
pub const PRIVACY_BONUS: u32 = 15;
pub const PRODUCT_BONUS: u32 = 10;

/// Analytics tooling detected from script URLs and inline snippets.
pub struct AnalyticsPhase;

impl PhaseScorer for AnalyticsPhase {
    fn phase(&self) -> Phase {
        Phase::Analytics
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        score_analytics(&ctx.snapshot)
    }
}

pub fn score_analytics(snapshot: &PageSnapshot) -> PhaseResult {
    if !snapshot.loaded {
        return unloaded_result(Phase::Analytics, snapshot);
    }
    let tools = ANALYTICS.detect(snapshot);
    let mut card = Scorecard::default();

    if tools.is_empty() {
        card.note(Finding::error("No analytics detected"));
        card.recommend(Recommendation::high(
            "Install an analytics tool",
            "Without analytics you cannot measure traffic, conversions or the impact of changes.",
            "Add a privacy-friendly tool such as Plausible or Fathom, or PostHog for product analytics.",
        ));
        return card.finish(Phase::Analytics);
    }

    for tool in &tools {
        card.note(Finding::success(format!("{} detected", tool.name)).with_details(tool.category.label()));
    }
    card.score = DETECTED_POINTS;

    if tools.len() > 1 {
        card.score += MULTIPLE_TOOLS_BONUS;
    }

    let has = |category: ToolCategory| tools.iter().any(|t| t.category == category);

    if has(ToolCategory::PrivacyAnalytics) {
        card.score += PRIVACY_BONUS;
    } else {
        card.recommend(Recommendation::low(
            "Consider privacy-friendly analytics",
            "Cookie-less analytics avoid consent banners and keep you compliant with GDPR.",
            "Evaluate Plausible, Fathom or Simple Analytics.",
        ));
    }

    if has(ToolCategory::ProductAnalytics) {
        card.score += PRODUCT_BONUS;
    } else {
        card.recommend(Recommendation::medium(
            "Add product analytics",
            "Page views alone do not show how visitors use your product or where they drop off.",
            "Track key events with PostHog, Mixpanel or Amplitude.",
        ));
    }

    if tools.iter().all(|t| t.category == ToolCategory::TagManager) {
        card.note(
            Finding::warning("Only a tag manager was found")
                .with_details("Analytics may be loaded through it but could not be confirmed"),
        );
    }

    card.finish(Phase::Analytics)
}
