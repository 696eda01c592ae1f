use std::ops::RangeInclusive;

use crate::browser::snapshot::PageSnapshot;
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard, unloaded_result};
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

pub const TITLE_POINTS: u32 = 25;
pub const TITLE_LENGTH_BONUS: u32 = 10;
pub const TITLE_IDEAL_LENGTH: RangeInclusive<usize> = 50..=60;

pub const DESCRIPTION_POINTS: u32 = 25;
pub const DESCRIPTION_LENGTH_BONUS: u32 = 10;
pub const DESCRIPTION_IDEAL_LENGTH: RangeInclusive<usize> = 150..=160;

pub const OPEN_GRAPH_POINTS: u32 = 20;
pub const KEYWORDS_POINTS: u32 = 10;

const OPEN_GRAPH_TAGS: [&str; 3] = ["og:title", "og:description", "og:image"];

/// Title, meta description, Open Graph and keywords.
pub struct SeoPhase;

impl PhaseScorer for SeoPhase {
    fn phase(&self) -> Phase {
        Phase::Seo
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        score_seo(&ctx.snapshot)
    }
}

pub fn score_seo(snapshot: &PageSnapshot) -> PhaseResult {
    if !snapshot.loaded {
        return unloaded_result(Phase::Seo, snapshot);
    }
    let mut card = Scorecard::default();

    // ---- Title ----
    let title = snapshot.title.trim();
    if title.is_empty() {
        card.note(Finding::error("Missing page title"));
        card.recommend(Recommendation::high(
            "Add a page title",
            "The title is the headline of your search result and browser tab.",
            "Add a descriptive <title> of 50-60 characters that includes your main keyword.",
        ));
    } else {
        let len = title.chars().count();
        card.award(TITLE_POINTS, Finding::success("Page title present").with_details(title));
        if TITLE_IDEAL_LENGTH.contains(&len) {
            card.award(
                TITLE_LENGTH_BONUS,
                Finding::success(format!("Title length is optimal ({} characters)", len)),
            );
        } else {
            card.note(Finding::warning(format!(
                "Title length is {} characters (ideal: 50-60)",
                len
            )));
            card.recommend(Recommendation::medium(
                "Optimize title length",
                "Titles outside 50-60 characters are truncated or under-use the search result.",
                "Rewrite the title to 50-60 characters.",
            ));
        }
    }

    // ---- Meta description ----
    match snapshot.meta("description").map(str::trim) {
        None => {
            card.note(Finding::error("Missing meta description"));
            card.recommend(Recommendation::high(
                "Add a meta description",
                "Search engines show the meta description under your title.",
                "Add <meta name=\"description\"> with a 150-160 character summary of the page.",
            ));
        }
        Some(description) => {
            let len = description.chars().count();
            card.award(DESCRIPTION_POINTS, Finding::success("Meta description present"));
            if DESCRIPTION_IDEAL_LENGTH.contains(&len) {
                card.award(
                    DESCRIPTION_LENGTH_BONUS,
                    Finding::success(format!(
                        "Meta description length is optimal ({} characters)",
                        len
                    )),
                );
            } else {
                card.note(Finding::warning(format!(
                    "Meta description length is {} characters (ideal: 150-160)",
                    len
                )));
                card.recommend(Recommendation::medium(
                    "Optimize meta description length",
                    "Descriptions outside 150-160 characters get truncated or look thin.",
                    "Rewrite the meta description to 150-160 characters.",
                ));
            }
        }
    }

    // ---- Open Graph ----
    let missing: Vec<&str> = OPEN_GRAPH_TAGS
        .into_iter()
        .filter(|tag| snapshot.meta(tag).is_none())
        .collect();
    if missing.is_empty() {
        card.award(OPEN_GRAPH_POINTS, Finding::success("Open Graph tags complete"));
    } else {
        let finding = if missing.len() == OPEN_GRAPH_TAGS.len() {
            Finding::warning("No Open Graph tags")
        } else {
            Finding::warning("Incomplete Open Graph tags")
        };
        card.note(finding.with_details(format!("Missing: {}", missing.join(", "))));
        card.recommend(Recommendation::medium(
            "Complete Open Graph tags",
            "Open Graph tags control how links to your site look when shared.",
            format!("Add {} meta tags.", missing.join(", ")),
        ));
    }

    // ---- Keywords ----
    if snapshot.meta("keywords").is_some() {
        card.award(KEYWORDS_POINTS, Finding::success("Meta keywords present"));
    }

    card.finish(Phase::Seo)
}
