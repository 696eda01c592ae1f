use tracing::{debug, warn};

use crate::browser::snapshot::PageSnapshot;
use crate::net::pagespeed::LighthouseMetrics;
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard, unloaded_result};
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

// ============================================================================
// Metric thresholds (Core Web Vitals / Lighthouse)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Seconds,
    Millis,
    Unitless,
}

/// Published good / needs-improvement bounds for one metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricThreshold {
    pub name: &'static str,
    pub good: f64,
    pub needs_improvement: f64,
    unit: Unit,
    advice: &'static str,
}

impl MetricThreshold {
    pub fn rate(&self, value: f64) -> Rating {
        if value <= self.good {
            Rating::Good
        } else if value <= self.needs_improvement {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }

    fn format(&self, value: f64) -> String {
        match self.unit {
            Unit::Seconds => format!("{:.1} s", value / 1000.0),
            Unit::Millis => format!("{:.0} ms", value),
            Unit::Unitless => format!("{:.3}", value),
        }
    }
}

pub const LCP: MetricThreshold = MetricThreshold {
    name: "Largest Contentful Paint",
    good: 2500.0,
    needs_improvement: 4000.0,
    unit: Unit::Seconds,
    advice: "Optimize the hero image, preload key resources and reduce server response time.",
};

pub const TBT: MetricThreshold = MetricThreshold {
    name: "Total Blocking Time",
    good: 200.0,
    needs_improvement: 600.0,
    unit: Unit::Millis,
    advice: "Split long JavaScript tasks, defer non-critical scripts and remove unused code.",
};

pub const CLS: MetricThreshold = MetricThreshold {
    name: "Cumulative Layout Shift",
    good: 0.1,
    needs_improvement: 0.25,
    unit: Unit::Unitless,
    advice: "Set explicit width and height on images and embeds and reserve space for late content.",
};

pub const SPEED_INDEX: MetricThreshold = MetricThreshold {
    name: "Speed Index",
    good: 3400.0,
    needs_improvement: 5800.0,
    unit: Unit::Seconds,
    advice: "Inline critical CSS and minimize render-blocking resources.",
};

pub const FCP: MetricThreshold = MetricThreshold {
    name: "First Contentful Paint",
    good: 1800.0,
    needs_improvement: 3000.0,
    unit: Unit::Seconds,
    advice: "Reduce render-blocking CSS/JS and serve assets from a CDN.",
};

// ============================================================================
// Heuristic fallback constants
// ============================================================================

pub const HEURISTIC_BASE: u32 = 30;
pub const HEURISTIC_FLOOR: u32 = 40;
pub const SMALL_PAGE_BYTES: usize = 100 * 1024;
pub const MEDIUM_PAGE_BYTES: usize = 250 * 1024;
pub const FEW_SCRIPTS: usize = 10;
pub const MANY_SCRIPTS: usize = 20;

/// Lighthouse metrics when a PageSpeed key is configured, page weight
/// heuristics otherwise.
pub struct PerformancePhase;

impl PhaseScorer for PerformancePhase {
    fn phase(&self) -> Phase {
        Phase::Performance
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        let fallback_reason = match &ctx.services.pagespeed {
            Some(api) => match api.run(&ctx.url) {
                Ok(metrics) => return score_lighthouse(&metrics),
                Err(e) => {
                    warn!(url = %ctx.url, error = %e, "PageSpeed run failed, using heuristics");
                    format!("PageSpeed API request failed: {}", e)
                }
            },
            None => {
                debug!(url = %ctx.url, "no PageSpeed key, using heuristics");
                "GOOGLE_PAGESPEED_API_KEY is not configured".to_string()
            }
        };

        let mut result = score_heuristic(&ctx.snapshot);
        result.findings.insert(
            0,
            Finding::warning("Real performance metrics unavailable").with_details(fallback_reason),
        );
        if ctx.services.pagespeed.is_none() {
            result.recommendations.push(Recommendation::low(
                "Enable Lighthouse measurements",
                "Estimates from page weight are far less precise than lab metrics.",
                "Set GOOGLE_PAGESPEED_API_KEY to score with PageSpeed Insights.",
            ));
        }
        result
    }
}

/// Score taken directly from Lighthouse, with one finding per reported metric.
pub fn score_lighthouse(metrics: &LighthouseMetrics) -> PhaseResult {
    let mut card = Scorecard::default();
    card.score = metrics.performance_score;

    let summary = format!("Lighthouse performance score: {}/100", metrics.performance_score);
    card.note(match metrics.performance_score {
        90.. => Finding::success(summary),
        50..=89 => Finding::warning(summary),
        _ => Finding::error(summary),
    });

    let measured = [
        (LCP, metrics.lcp_ms),
        (TBT, metrics.tbt_ms),
        (CLS, metrics.cls),
        (SPEED_INDEX, metrics.speed_index_ms),
        (FCP, metrics.fcp_ms),
    ];

    for (threshold, value) in measured {
        let Some(value) = value else { continue };
        let message = format!("{}: {}", threshold.name, threshold.format(value));
        match threshold.rate(value) {
            Rating::Good => card.note(Finding::success(message)),
            Rating::NeedsImprovement => {
                card.note(Finding::warning(message).with_details("Needs improvement"));
                card.recommend(Recommendation::medium(
                    format!("Improve {}", threshold.name),
                    format!(
                        "{} is above the {} good threshold.",
                        threshold.name,
                        threshold.format(threshold.good)
                    ),
                    threshold.advice,
                ));
            }
            Rating::Poor => {
                card.note(Finding::error(message).with_details("Poor"));
                card.recommend(Recommendation::high(
                    format!("Fix slow {}", threshold.name),
                    format!(
                        "{} is above the {} poor threshold.",
                        threshold.name,
                        threshold.format(threshold.needs_improvement)
                    ),
                    threshold.advice,
                ));
            }
        }
    }

    card.finish(Phase::Performance)
}

/// Estimate from HTML size and script count, never below `HEURISTIC_FLOOR`.
pub fn score_heuristic(snapshot: &PageSnapshot) -> PhaseResult {
    if !snapshot.loaded {
        return unloaded_result(Phase::Performance, snapshot);
    }
    let mut card = Scorecard::default();
    card.score = HEURISTIC_BASE;

    let bytes = snapshot.html.len();
    let kb = bytes / 1024;
    if bytes < SMALL_PAGE_BYTES {
        card.award(35, Finding::success(format!("Lightweight HTML ({} KB)", kb)));
    } else {
        let points = if bytes < MEDIUM_PAGE_BYTES { 20 } else { 0 };
        card.award(points, Finding::warning(format!("Heavy HTML ({} KB)", kb)));
        card.recommend(Recommendation::medium(
            "Reduce page weight",
            "Large documents take longer to download and parse, especially on mobile.",
            "Remove inline data blobs, lazy-load below-the-fold content and enable compression.",
        ));
    }

    let scripts = snapshot.scripts.len();
    if scripts <= FEW_SCRIPTS {
        card.award(35, Finding::success(format!("{} external scripts", scripts)));
    } else {
        let points = if scripts <= MANY_SCRIPTS { 20 } else { 0 };
        card.award(points, Finding::warning(format!("{} external scripts", scripts)));
        card.recommend(Recommendation::medium(
            "Reduce script count",
            "Every script adds network requests and main-thread work.",
            "Bundle first-party scripts and audit third-party tags you no longer need.",
        ));
    }

    card.score = card.score.max(HEURISTIC_FLOOR);
    card.finish(Phase::Performance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundaries_are_inclusive() {
        assert_eq!(LCP.rate(2500.0), Rating::Good);
        assert_eq!(LCP.rate(2501.0), Rating::NeedsImprovement);
        assert_eq!(LCP.rate(4000.0), Rating::NeedsImprovement);
        assert_eq!(LCP.rate(4000.1), Rating::Poor);
        assert_eq!(CLS.rate(0.1), Rating::Good);
        assert_eq!(CLS.rate(0.2), Rating::NeedsImprovement);
        assert_eq!(TBT.rate(601.0), Rating::Poor);
    }
}
