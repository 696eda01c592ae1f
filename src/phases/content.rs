use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::browser::snapshot::{PageSnapshot, h1_texts, truncate_chars, visible_text};
use crate::llm::analysis::{ContentAnalysis, parse_structured};
use crate::llm::inference::{InferenceRequest, TextInference};
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard, Timeouts, unloaded_result};
use crate::scanner::error::ScanError;
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

/// Characters of visible page text sent to the model.
pub const MAX_PROMPT_CHARS: usize = 4000;
const MAX_TOKENS: u32 = 800;

pub const BASE_POINTS: u32 = 15;
pub const CTA_POINTS: u32 = 25;
pub const SOCIAL_PROOF_POINTS: u32 = 20;
pub const TITLE_POINTS: u32 = 15;
pub const HEADLINE_POINTS: u32 = 15;
pub const HEURISTIC_FLOOR: u32 = 35;
pub const TITLE_LENGTH: RangeInclusive<usize> = 30..=70;
/// Minimum characters for an `<h1>` to count as a real headline.
pub const SUBSTANTIVE_H1_CHARS: usize = 10;

const SYSTEM_PROMPT: &str = r#"You are a conversion copywriting expert reviewing a website's landing page before launch.
Rate the copy and respond with ONLY a JSON object of this exact shape:
{
  "score": <integer 0-100, overall content readiness>,
  "valueProposition": {"score": <integer 0-100>, "feedback": "<one sentence>"},
  "headline": {"score": <integer 0-100>, "feedback": "<one sentence>"},
  "cta": {"score": <integer 0-100>, "feedback": "<one sentence>"},
  "socialProof": {"score": <integer 0-100>, "feedback": "<one sentence>"},
  "readability": {"score": <integer 0-100>, "feedback": "<one sentence>"},
  "improvements": ["<most important concrete change>", "<next change>", "..."]
}"#;

static CTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(get started|sign up|start (your )?free|try (it )?(for )?free|free trial|book a demo|request a demo|schedule a demo|buy now|shop now|contact (us|sales)|subscribe|join (now|today|free)|download now|start now|create (an |your )?account)\b",
    )
    .expect("valid regex")
});

static SOCIAL_PROOF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(testimonials?|trusted by|loved by|used by|customers (say|love)|reviews?|case stud(y|ies)|as seen (on|in)|\d[\d,.]*\s*[km]?\+?\s*(users|customers|companies|teams|developers|downloads))\b",
    )
    .expect("valid regex")
});

/// Landing page copy quality: LLM review when configured, pattern checks otherwise.
pub struct ContentPhase;

impl PhaseScorer for ContentPhase {
    fn phase(&self) -> Phase {
        Phase::Content
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        if !ctx.snapshot.loaded {
            return unloaded_result(Phase::Content, &ctx.snapshot);
        }

        let Some(llm) = &ctx.services.llm else {
            debug!(url = %ctx.url, "no LLM configured, using content heuristics");
            return score_heuristic(&ctx.snapshot);
        };

        match analyze_with_llm(llm.as_ref(), &ctx.url, &ctx.snapshot, &ctx.services.timeouts) {
            Ok(analysis) => score_analysis(&analysis),
            Err(e) => {
                warn!(url = %ctx.url, error = %e, "LLM content analysis failed, using heuristics");
                let mut result = score_heuristic(&ctx.snapshot);
                result.findings.insert(
                    0,
                    Finding::warning("AI content analysis unavailable").with_details(e.to_string()),
                );
                result
            }
        }
    }
}

/// Page text as sent to the model: tags stripped, capped at `MAX_PROMPT_CHARS`.
pub fn prompt_text(html: &str) -> String {
    truncate_chars(&visible_text(html), MAX_PROMPT_CHARS).to_string()
}

pub fn analyze_with_llm(
    llm: &dyn TextInference,
    url: &str,
    snapshot: &PageSnapshot,
    timeouts: &Timeouts,
) -> Result<ContentAnalysis, ScanError> {
    let request = InferenceRequest {
        system: SYSTEM_PROMPT.to_string(),
        prompt: format!(
            "URL: {}\nTitle: {}\n\nPage text:\n{}",
            url,
            snapshot.title,
            prompt_text(&snapshot.html)
        ),
        max_tokens: MAX_TOKENS,
        temperature: 0.3,
        timeout: timeouts.llm,
    };
    let response = llm.infer_text(&request)?;
    Ok(parse_structured::<ContentAnalysis>(&response)?)
}

/// Findings and recommendations from a validated model review.
pub fn score_analysis(analysis: &ContentAnalysis) -> PhaseResult {
    let mut card = Scorecard::default();
    card.score = analysis.score;

    for (label, aspect) in analysis.aspects() {
        let message = format!("{}: {}/100", label, aspect.score);
        let finding = match aspect.score {
            70.. => Finding::success(message),
            40..=69 => Finding::warning(message),
            _ => Finding::error(message),
        };
        card.note(finding.with_details(aspect.feedback.trim()));
    }

    let improvements = analysis
        .improvements
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty());
    for (i, improvement) in improvements.enumerate() {
        let title = truncate_chars(improvement, 80);
        let recommendation = if i == 0 {
            Recommendation::high(title, improvement, improvement)
        } else {
            Recommendation::medium(title, improvement, improvement)
        };
        card.recommend(recommendation);
    }

    card.finish(Phase::Content)
}

/// Deterministic pattern checks, never below `HEURISTIC_FLOOR`.
pub fn score_heuristic(snapshot: &PageSnapshot) -> PhaseResult {
    if !snapshot.loaded {
        return unloaded_result(Phase::Content, snapshot);
    }
    let text = visible_text(&snapshot.html);
    let mut card = Scorecard::default();
    card.score = BASE_POINTS;

    match CTA_RE.find(&text) {
        Some(m) => card.award(
            CTA_POINTS,
            Finding::success("Call to action found").with_details(format!("\"{}\"", m.as_str())),
        ),
        None => {
            card.note(Finding::warning("No clear call to action"));
            card.recommend(Recommendation::high(
                "Add a clear call to action",
                "Visitors need an obvious next step such as signing up or booking a demo.",
                "Add a prominent button like \"Get started\" above the fold.",
            ));
        }
    }

    match SOCIAL_PROOF_RE.find(&text) {
        Some(m) => card.award(
            SOCIAL_PROOF_POINTS,
            Finding::success("Social proof found").with_details(format!("\"{}\"", m.as_str())),
        ),
        None => {
            card.note(Finding::warning("No social proof"));
            card.recommend(Recommendation::medium(
                "Add social proof",
                "Testimonials, customer logos and usage numbers make new visitors trust you.",
                "Add two or three testimonials or a \"Trusted by\" logo strip.",
            ));
        }
    }

    let title_len = snapshot.title.trim().chars().count();
    if TITLE_LENGTH.contains(&title_len) {
        card.award(TITLE_POINTS, Finding::success("Descriptive page title"));
    } else {
        card.note(Finding::warning(format!(
            "Title length is {} characters (aim for 30-70)",
            title_len
        )));
        card.recommend(Recommendation::medium(
            "Write a descriptive title",
            "The title should say what the product is and who it is for.",
            "Rewrite the title to 30-70 characters.",
        ));
    }

    let headline = h1_texts(&snapshot.html)
        .into_iter()
        .find(|h| h.chars().count() >= SUBSTANTIVE_H1_CHARS);
    match headline {
        Some(h1) => card.award(HEADLINE_POINTS, Finding::success("Clear headline").with_details(h1)),
        None => {
            card.note(Finding::warning("No substantive H1 headline"));
            card.recommend(Recommendation::high(
                "Add a headline",
                "The H1 is the first thing visitors read and should state your value proposition.",
                "Add a single <h1> that says what you do and for whom.",
            ));
        }
    }

    card.score = card.score.max(HEURISTIC_FLOOR);
    card.finish(Phase::Content)
}
