use crate::browser::snapshot::PageSnapshot;
use crate::phases::signatures::{SHARE_WIDGETS, SOCIAL_PROFILES};
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard, unloaded_result};
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

pub const PROFILE_POINTS: u32 = 40;
pub const MANY_PROFILES_BONUS: u32 = 15;
pub const MANY_PROFILES: usize = 3;
pub const TWITTER_CARD_POINTS: u32 = 20;
pub const OG_IMAGE_POINTS: u32 = 15;
pub const SHARE_WIDGET_POINTS: u32 = 10;

/// Social profile links, share previews and share widgets.
pub struct SocialPhase;

impl PhaseScorer for SocialPhase {
    fn phase(&self) -> Phase {
        Phase::Social
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        score_social(&ctx.snapshot)
    }
}

pub fn score_social(snapshot: &PageSnapshot) -> PhaseResult {
    if !snapshot.loaded {
        return unloaded_result(Phase::Social, snapshot);
    }
    let mut card = Scorecard::default();

    let profiles = SOCIAL_PROFILES.detect(snapshot);
    if profiles.is_empty() {
        card.note(Finding::error("No social profile links found"));
        card.recommend(Recommendation::high(
            "Link your social profiles",
            "Visible social profiles build trust and give visitors a way to follow you.",
            "Add links to your X, LinkedIn or GitHub profiles in the header or footer.",
        ));
    } else {
        let names: Vec<&str> = profiles.iter().map(|p| p.name).collect();
        card.award(
            PROFILE_POINTS,
            Finding::success(format!("{} social profile(s) linked", profiles.len()))
                .with_details(names.join(", ")),
        );
        if profiles.len() >= MANY_PROFILES {
            card.score += MANY_PROFILES_BONUS;
        }
    }

    if snapshot.meta("twitter:card").is_some() {
        card.award(TWITTER_CARD_POINTS, Finding::success("Twitter Card configured"));
    } else {
        card.note(Finding::warning("Twitter Card tags missing"));
        card.recommend(Recommendation::medium(
            "Add Twitter Card tags",
            "Without them links shared on X render as plain URLs.",
            "Add <meta name=\"twitter:card\" content=\"summary_large_image\"> plus title and image tags.",
        ));
    }

    if snapshot.meta("og:image").is_some() {
        card.award(OG_IMAGE_POINTS, Finding::success("Share image (og:image) set"));
    } else {
        card.note(Finding::warning("No share image (og:image)"));
        card.recommend(Recommendation::medium(
            "Add a share image",
            "Posts with an image get far more engagement than text-only previews.",
            "Add a 1200x630 og:image meta tag.",
        ));
    }

    let widgets = SHARE_WIDGETS.detect(snapshot);
    if let Some(widget) = widgets.first() {
        card.award(
            SHARE_WIDGET_POINTS,
            Finding::success("Share widget detected").with_details(widget.name),
        );
    } else {
        card.recommend(Recommendation::low(
            "Add share buttons",
            "Share buttons make it easy for visitors to spread your content.",
            "Add lightweight share links for X, LinkedIn and Facebook.",
        ));
    }

    card.finish(Phase::Social)
}
