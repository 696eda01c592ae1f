use std::sync::LazyLock;

use regex::Regex;

use crate::browser::snapshot::PageSnapshot;

/// What kind of third-party tool a signature identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    WebAnalytics,
    PrivacyAnalytics,
    ProductAnalytics,
    TagManager,
    SocialProfile,
    ShareWidget,
    ErrorTracking,
    SessionReplay,
    Apm,
}

impl ToolCategory {
    pub fn label(self) -> &'static str {
        match self {
            ToolCategory::WebAnalytics => "web analytics",
            ToolCategory::PrivacyAnalytics => "privacy-friendly analytics",
            ToolCategory::ProductAnalytics => "product analytics",
            ToolCategory::TagManager => "tag manager",
            ToolCategory::SocialProfile => "social profile",
            ToolCategory::ShareWidget => "share widget",
            ToolCategory::ErrorTracking => "error tracking",
            ToolCategory::SessionReplay => "session replay",
            ToolCategory::Apm => "performance monitoring",
        }
    }
}

/// A vendor fingerprint matched against script URLs and raw HTML.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub name: &'static str,
    pub category: ToolCategory,
    pub pattern: &'static str,
}

const fn sig(name: &'static str, category: ToolCategory, pattern: &'static str) -> Signature {
    Signature {
        name,
        category,
        pattern,
    }
}

pub const ANALYTICS_SIGNATURES: &[Signature] = &[
    sig(
        "Google Analytics",
        ToolCategory::WebAnalytics,
        r#"google-analytics\.com/(analytics|ga)\.js|googletagmanager\.com/gtag/js|gtag\(\s*['"]config['"]"#,
    ),
    sig(
        "Google Tag Manager",
        ToolCategory::TagManager,
        r"googletagmanager\.com/gtm\.js|\bGTM-[A-Z0-9]{4,}\b",
    ),
    sig("Plausible", ToolCategory::PrivacyAnalytics, r"plausible\.io/js/"),
    sig("Fathom", ToolCategory::PrivacyAnalytics, r"cdn\.usefathom\.com"),
    sig(
        "Simple Analytics",
        ToolCategory::PrivacyAnalytics,
        r"scripts\.simpleanalyticscdn\.com",
    ),
    sig("Umami", ToolCategory::PrivacyAnalytics, r"analytics\.umami\.is|/umami\.js"),
    sig("Matomo", ToolCategory::PrivacyAnalytics, r"matomo\.js|piwik\.js"),
    sig(
        "Vercel Analytics",
        ToolCategory::PrivacyAnalytics,
        r"/_vercel/insights/script\.js|va\.vercel-scripts\.com",
    ),
    sig(
        "Cloudflare Web Analytics",
        ToolCategory::PrivacyAnalytics,
        r"static\.cloudflareinsights\.com/beacon",
    ),
    sig(
        "PostHog",
        ToolCategory::ProductAnalytics,
        r"posthog\.com/static/array\.js|\b(us|eu)(-assets)?\.i\.posthog\.com|posthog\.init\(",
    ),
    sig("Mixpanel", ToolCategory::ProductAnalytics, r"cdn\.mxpnl\.com|mixpanel\.init\("),
    sig("Amplitude", ToolCategory::ProductAnalytics, r"cdn\.amplitude\.com|amplitude\.getInstance\("),
    sig("Segment", ToolCategory::ProductAnalytics, r"cdn\.segment\.com/analytics\.js"),
    sig("Heap", ToolCategory::ProductAnalytics, r"cdn\.heapanalytics\.com|heap\.load\("),
];

pub const SOCIAL_PROFILE_SIGNATURES: &[Signature] = &[
    sig("X (Twitter)", ToolCategory::SocialProfile, r"https?://(www\.)?(twitter|x)\.com/[A-Za-z0-9_]+"),
    sig("Facebook", ToolCategory::SocialProfile, r"https?://(www\.)?facebook\.com/[A-Za-z0-9.\-]+"),
    sig("LinkedIn", ToolCategory::SocialProfile, r"https?://(www\.)?linkedin\.com/(company|in)/"),
    sig("Instagram", ToolCategory::SocialProfile, r"https?://(www\.)?instagram\.com/[A-Za-z0-9_.]+"),
    sig("YouTube", ToolCategory::SocialProfile, r"https?://(www\.)?youtube\.com/(@|c/|channel/|user/)"),
    sig("GitHub", ToolCategory::SocialProfile, r"https?://(www\.)?github\.com/[A-Za-z0-9\-]+"),
    sig("TikTok", ToolCategory::SocialProfile, r"https?://(www\.)?tiktok\.com/@"),
    sig("Discord", ToolCategory::SocialProfile, r"https?://(www\.)?discord\.(gg|com/invite)/"),
];

pub const SHARE_WIDGET_SIGNATURES: &[Signature] = &[
    sig("AddThis", ToolCategory::ShareWidget, r"addthis\.com|addthis_widget"),
    sig("ShareThis", ToolCategory::ShareWidget, r"sharethis\.com"),
    sig("X widgets", ToolCategory::ShareWidget, r"platform\.twitter\.com/widgets\.js"),
    sig("Facebook SDK", ToolCategory::ShareWidget, r"connect\.facebook\.net/[A-Za-z_]+/sdk\.js"),
];

pub const MONITORING_SIGNATURES: &[Signature] = &[
    sig(
        "Sentry",
        ToolCategory::ErrorTracking,
        r"(browser|js)\.sentry-cdn\.com|ingest\.sentry\.io|Sentry\.init\(",
    ),
    sig("Bugsnag", ToolCategory::ErrorTracking, r"bugsnag"),
    sig("Rollbar", ToolCategory::ErrorTracking, r"cdn\.rollbar\.com|_rollbarConfig"),
    sig("TrackJS", ToolCategory::ErrorTracking, r"cdn\.trackjs\.com|TrackJS\.install"),
    sig("Honeybadger", ToolCategory::ErrorTracking, r"js\.honeybadger\.io"),
    sig("LogRocket", ToolCategory::SessionReplay, r"cdn\.(lr-ingest\.io|logrocket\.io)|LogRocket\.init\("),
    sig("FullStory", ToolCategory::SessionReplay, r"edge\.fullstory\.com|fullstory\.com/s/fs\.js"),
    sig("Hotjar", ToolCategory::SessionReplay, r"static\.hotjar\.com"),
    sig("Microsoft Clarity", ToolCategory::SessionReplay, r"clarity\.ms/tag"),
    sig("Datadog RUM", ToolCategory::Apm, r"datadoghq-browser-agent\.com|DD_RUM"),
    sig("New Relic", ToolCategory::Apm, r"js-agent\.newrelic\.com|NREUM"),
    sig("Elastic APM", ToolCategory::Apm, r"elastic-apm-rum|elasticApm\.init"),
];

/// A compiled signature table.
pub struct SignatureSet {
    entries: Vec<(Signature, Regex)>,
}

impl SignatureSet {
    pub fn new(signatures: &[Signature]) -> Self {
        let entries = signatures
            .iter()
            .map(|s| {
                let re = Regex::new(&format!("(?i){}", s.pattern)).expect("valid signature regex");
                (*s, re)
            })
            .collect();
        Self { entries }
    }

    /// Tools whose signature appears in a script URL or the HTML, in table order.
    pub fn detect(&self, snapshot: &PageSnapshot) -> Vec<Signature> {
        self.entries
            .iter()
            .filter(|(_, re)| {
                snapshot.scripts.iter().any(|src| re.is_match(src)) || re.is_match(&snapshot.html)
            })
            .map(|(sig, _)| *sig)
            .collect()
    }
}

pub static ANALYTICS: LazyLock<SignatureSet> =
    LazyLock::new(|| SignatureSet::new(ANALYTICS_SIGNATURES));
pub static SOCIAL_PROFILES: LazyLock<SignatureSet> =
    LazyLock::new(|| SignatureSet::new(SOCIAL_PROFILE_SIGNATURES));
pub static SHARE_WIDGETS: LazyLock<SignatureSet> =
    LazyLock::new(|| SignatureSet::new(SHARE_WIDGET_SIGNATURES));
pub static MONITORING: LazyLock<SignatureSet> =
    LazyLock::new(|| SignatureSet::new(MONITORING_SIGNATURES));
