use launch_ready::browser::snapshot::PageSnapshot;
use launch_ready::llm::inference::{FailingInference, MockTextInference};
use launch_ready::net::http::{ResponseHeaders, StaticWebClient};
use launch_ready::net::pagespeed::{LighthouseMetrics, StaticPageSpeed};
use launch_ready::phases::analytics::score_analytics;
use launch_ready::phases::content::{self, score_analysis};
use launch_ready::phases::domain::score_domain;
use launch_ready::phases::monitoring::{robots_url, score_monitoring};
use launch_ready::phases::performance::{self, score_lighthouse};
use launch_ready::phases::security::{HTTPS_FLOOR, PLAIN_HTTP_FLOOR, score_security};
use launch_ready::phases::seo::score_seo;
use launch_ready::phases::social::score_social;
use launch_ready::phases::{Phase, default_scorers};
use launch_ready::scanner::model::{FindingKind, PHASE_MAX_SCORE, Priority};

use crate::common::{
    ROBOTS_TXT, SITE, bare_snapshot, context, hardened_headers, launch_ready_snapshot, messages,
    offline_services, services_with, with_llm, with_pagespeed,
};

mod common;

fn snapshot_with(html: &str) -> PageSnapshot {
    PageSnapshot::from_html(html)
}

// ============================================================================
// 1. Phase identity
// ============================================================================

#[test]
fn phases_are_in_report_order() {
    let names: Vec<&str> = Phase::ALL.iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec!["Domain", "SEO", "Performance", "Security", "Analytics", "Social", "Content", "Monitoring"]
    );
}

#[test]
fn phase_from_name_is_case_insensitive() {
    assert_eq!(Phase::from_name("seo"), Some(Phase::Seo));
    assert_eq!(Phase::from_name("Monitoring"), Some(Phase::Monitoring));
    assert_eq!(Phase::from_name("uptime"), None);
}

#[test]
fn default_scorers_cover_every_phase() {
    let phases: Vec<Phase> = default_scorers().iter().map(|s| s.phase()).collect();
    assert_eq!(phases, Phase::ALL.to_vec());
}

// ============================================================================
// 2. Domain
// ============================================================================

#[test]
fn domain_https_www_scores_full_marks() {
    let result = score_domain("https://www.example.com");
    assert_eq!(result.phase_name, "Domain");
    assert_eq!(result.score, 100);
    assert!(result.recommendations.is_empty());
    assert!(!result.has_errors());
}

#[test]
fn domain_plain_http_apex() {
    let result = score_domain("http://example.com");
    assert_eq!(result.score, 65);
    assert!(messages(&result).contains(&"HTTPS not enabled"));

    let titles: Vec<&str> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert!(titles.contains(&"Enable HTTPS"));
    assert!(titles.contains(&"Configure a www redirect"));
    let https = result
        .recommendations
        .iter()
        .find(|r| r.title == "Enable HTTPS")
        .unwrap();
    assert_eq!(https.priority, Priority::High);
}

#[test]
fn domain_https_apex() {
    assert_eq!(score_domain("https://example.com").score, 95);
}

#[test]
fn domain_localhost_is_not_a_custom_domain() {
    let result = score_domain("http://localhost:3000");
    assert_eq!(result.score, 10 + 35);
    assert_eq!(result.count(FindingKind::Warning), 1);
}

#[test]
fn domain_invalid_url_scores_zero() {
    let result = score_domain("not a url");
    assert_eq!(result.score, 0);
    assert_eq!(messages(&result), vec!["Invalid URL"]);
    assert_eq!(result.max_score, PHASE_MAX_SCORE);
}

// ============================================================================
// 3. SEO
// ============================================================================

#[test]
fn seo_complete_page_scores_full_marks() {
    let result = score_seo(&launch_ready_snapshot());
    assert_eq!(result.score, 100);
    assert_eq!(result.count(FindingKind::Error), 0);
    assert_eq!(result.count(FindingKind::Warning), 0);
}

#[test]
fn seo_empty_page_reports_missing_title_and_description() {
    let result = score_seo(&bare_snapshot());
    assert_eq!(result.score, 0);
    assert_eq!(result.count(FindingKind::Error), 2);
    assert!(messages(&result).contains(&"Missing page title"));
    assert!(messages(&result).contains(&"Missing meta description"));
    assert!(messages(&result).contains(&"No Open Graph tags"));
}

#[test]
fn seo_partial_open_graph_and_short_title() {
    let snapshot = snapshot_with(
        r#"<title>Short</title><meta property="og:title" content="Acme"><meta name="description" content="Too short">"#,
    );
    let result = score_seo(&snapshot);
    // title 25 + description 25, no length bonuses, no OG, no keywords
    assert_eq!(result.score, 50);
    assert!(messages(&result).contains(&"Incomplete Open Graph tags"));
    let og = result
        .findings
        .iter()
        .find(|f| f.message == "Incomplete Open Graph tags")
        .unwrap();
    assert_eq!(og.details.as_deref(), Some("Missing: og:description, og:image"));
}

#[test]
fn seo_blank_meta_content_counts_as_missing() {
    let snapshot = snapshot_with(r#"<title>Acme</title><meta name="description" content="   ">"#);
    let result = score_seo(&snapshot);
    assert!(messages(&result).contains(&"Missing meta description"));
}

// ============================================================================
// 4. Performance
// ============================================================================

#[test]
fn performance_uses_lighthouse_when_available() {
    let metrics = LighthouseMetrics {
        performance_score: 93,
        lcp_ms: Some(1800.0),
        tbt_ms: Some(450.0),
        cls: Some(0.3),
        speed_index_ms: None,
        fcp_ms: Some(900.0),
    };
    let services = with_pagespeed(offline_services(), StaticPageSpeed { metrics: Some(metrics) });
    let ctx = context(SITE, launch_ready_snapshot(), services);

    let result = Phase::Performance.scorer().score(&ctx);
    assert_eq!(result.score, 93);
    assert_eq!(result.findings[0].kind, FindingKind::Success);

    let titles: Vec<&str> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Improve Total Blocking Time", "Fix slow Cumulative Layout Shift"]);
}

#[test]
fn lighthouse_summary_severity_follows_score_band() {
    let metrics = |score| LighthouseMetrics {
        performance_score: score,
        lcp_ms: None,
        tbt_ms: None,
        cls: None,
        speed_index_ms: None,
        fcp_ms: None,
    };
    assert_eq!(score_lighthouse(&metrics(90)).findings[0].kind, FindingKind::Success);
    assert_eq!(score_lighthouse(&metrics(89)).findings[0].kind, FindingKind::Warning);
    assert_eq!(score_lighthouse(&metrics(50)).findings[0].kind, FindingKind::Warning);
    assert_eq!(score_lighthouse(&metrics(49)).findings[0].kind, FindingKind::Error);
}

#[test]
fn performance_without_key_falls_back_to_heuristics() {
    let ctx = context(SITE, launch_ready_snapshot(), offline_services());
    let result = Phase::Performance.scorer().score(&ctx);

    assert_eq!(result.score, 100);
    assert_eq!(result.findings[0].message, "Real performance metrics unavailable");
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.title == "Enable Lighthouse measurements")
    );
}

#[test]
fn performance_api_failure_falls_back_without_key_recommendation() {
    let services = with_pagespeed(offline_services(), StaticPageSpeed { metrics: None });
    let ctx = context(SITE, launch_ready_snapshot(), services);
    let result = Phase::Performance.scorer().score(&ctx);

    assert_eq!(result.findings[0].message, "Real performance metrics unavailable");
    assert!(
        result.findings[0]
            .details
            .as_deref()
            .unwrap()
            .starts_with("PageSpeed API request failed")
    );
    assert!(
        !result
            .recommendations
            .iter()
            .any(|r| r.title == "Enable Lighthouse measurements")
    );
}

#[test]
fn performance_heuristic_penalizes_heavy_pages() {
    let scripts: String = (0..25)
        .map(|i| format!("<script src=\"/s{}.js\"></script>", i))
        .collect();
    let padding = "x".repeat(300 * 1024);
    let snapshot = snapshot_with(&format!("<title>Heavy</title>{}<p>{}</p>", scripts, padding));

    let result = performance::score_heuristic(&snapshot);
    // 30 base + 0 + 0 is lifted to the floor
    assert_eq!(result.score, performance::HEURISTIC_FLOOR);
    assert_eq!(result.recommendations.len(), 2);
}

// ============================================================================
// 5. Security
// ============================================================================

#[test]
fn security_hardened_site_scores_full_marks() {
    let result = score_security(SITE, Ok(hardened_headers()));
    assert_eq!(result.score, 100);
    assert!(result.recommendations.is_empty());
}

#[test]
fn security_missing_headers_yield_warnings() {
    let headers = ResponseHeaders::new(200).with("x-frame-options", "SAMEORIGIN");
    let result = score_security(SITE, Ok(headers));

    assert_eq!(result.score, 30 + 10);
    assert_eq!(result.count(FindingKind::Warning), 6);
    assert_eq!(result.recommendations.len(), 6);
}

#[test]
fn security_frame_ancestors_counts_as_clickjacking_protection() {
    let headers = ResponseHeaders::new(200)
        .with("Content-Security-Policy", "default-src 'self'; frame-ancestors 'none'");
    let result = score_security(SITE, Ok(headers));
    assert!(messages(&result).contains(&"Clickjacking protection enabled"));
}

#[test]
fn security_header_fetch_failure_applies_floor() {
    let https = score_security(SITE, Err("connection reset".into()));
    assert_eq!(https.score, HTTPS_FLOOR);
    assert!(messages(&https).contains(&"Could not fetch security headers"));

    let plain = score_security("http://acme.dev", Err("connection reset".into()));
    assert_eq!(plain.score, PLAIN_HTTP_FLOOR);
    assert!(plain.has_errors());
}

#[test]
fn security_phase_queries_the_web_client() {
    let ctx = context(SITE, PageSnapshot::failed("offline"), services_with(StaticWebClient::new()));
    let result = Phase::Security.scorer().score(&ctx);
    // StaticWebClient without headers answers 503
    assert_eq!(result.score, HTTPS_FLOOR);
}

// ============================================================================
// 6. Analytics
// ============================================================================

#[test]
fn analytics_posthog_alone() {
    let snapshot =
        snapshot_with(r#"<script src="https://app.posthog.com/static/array.js"></script>"#);
    let result = score_analytics(&snapshot);

    assert!(result.score >= 60);
    assert_eq!(result.score, 60 + 10);
    assert!(messages(&result).contains(&"PostHog detected"));
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.title == "Consider privacy-friendly analytics")
    );
}

#[test]
fn analytics_privacy_and_product_tools_score_full_marks() {
    let result = score_analytics(&launch_ready_snapshot());
    assert_eq!(result.score, 100);
    assert!(result.recommendations.is_empty());
}

#[test]
fn analytics_none_detected() {
    let result = score_analytics(&bare_snapshot());
    assert_eq!(result.score, 0);
    assert_eq!(messages(&result), vec!["No analytics detected"]);
    assert_eq!(result.recommendations[0].priority, Priority::High);
}

#[test]
fn analytics_inline_snippet_is_detected() {
    let snapshot = snapshot_with("<script>posthog.init('phc_123', {api_host: 'x'})</script>");
    assert!(messages(&score_analytics(&snapshot)).contains(&"PostHog detected"));
}

#[test]
fn analytics_tag_manager_only_warns() {
    let snapshot = snapshot_with(
        r#"<script src="https://www.googletagmanager.com/gtm.js?id=GTM-ABC1234"></script>"#,
    );
    let result = score_analytics(&snapshot);
    assert!(messages(&result).contains(&"Only a tag manager was found"));
}

// ============================================================================
// 7. Social
// ============================================================================

#[test]
fn social_well_linked_page_scores_full_marks() {
    let result = score_social(&launch_ready_snapshot());
    assert_eq!(result.score, 100);
    assert!(messages(&result).contains(&"3 social profile(s) linked"));
}

#[test]
fn social_nothing_found() {
    let result = score_social(&bare_snapshot());
    assert_eq!(result.score, 0);
    assert!(messages(&result).contains(&"No social profile links found"));
    assert_eq!(result.recommendations.len(), 4);
}

#[test]
fn social_single_profile_without_cards() {
    let snapshot = snapshot_with(r#"<a href="https://github.com/acme">GitHub</a>"#);
    let result = score_social(&snapshot);
    assert_eq!(result.score, 40);
    assert!(messages(&result).contains(&"Twitter Card tags missing"));
}

// ============================================================================
// 8. Content
// ============================================================================

const ANALYSIS_JSON: &str = r#"{
  "score": 72,
  "valueProposition": {"score": 80, "feedback": "Clear promise."},
  "headline": {"score": 65, "feedback": "Could be punchier."},
  "cta": {"score": 90, "feedback": "Obvious next step."},
  "socialProof": {"score": 30, "feedback": "Only one quote."},
  "readability": {"score": 75, "feedback": "Short sentences."},
  "improvements": ["Add customer logos under the hero", "Tighten the headline", "  "]
}"#;

#[test]
fn content_heuristic_on_strong_page() {
    let result = content::score_heuristic(&launch_ready_snapshot());
    assert_eq!(result.score, 90);
    assert!(messages(&result).contains(&"Call to action found"));
    assert!(messages(&result).contains(&"Social proof found"));
    assert!(messages(&result).contains(&"Clear headline"));
}

#[test]
fn content_heuristic_never_below_floor() {
    let result = content::score_heuristic(&bare_snapshot());
    assert_eq!(result.score, content::HEURISTIC_FLOOR);
}

#[test]
fn content_uses_llm_analysis() {
    let services = with_llm(offline_services(), MockTextInference::new(ANALYSIS_JSON));
    let ctx = context(SITE, launch_ready_snapshot(), services);
    let result = Phase::Content.scorer().score(&ctx);

    assert_eq!(result.score, 72);
    assert_eq!(result.findings.len(), 5);
    assert_eq!(result.count(FindingKind::Success), 3);
    assert_eq!(result.count(FindingKind::Warning), 1);
    assert_eq!(result.count(FindingKind::Error), 1);

    // Blank improvements are dropped, the first one is high priority
    assert_eq!(result.recommendations.len(), 2);
    assert_eq!(result.recommendations[0].priority, Priority::High);
    assert_eq!(result.recommendations[1].priority, Priority::Medium);
}

#[test]
fn content_llm_failure_falls_back_to_heuristic() {
    let services = with_llm(offline_services(), FailingInference);
    let ctx = context(SITE, launch_ready_snapshot(), services);
    let result = Phase::Content.scorer().score(&ctx);

    assert_eq!(result.findings[0].message, "AI content analysis unavailable");
    assert_eq!(result.findings[0].kind, FindingKind::Warning);
    assert_eq!(result.score, 90);
}

#[test]
fn content_llm_schema_violation_falls_back() {
    let services = with_llm(
        offline_services(),
        MockTextInference::new(r#"{"score": 140, "verdict": "great"}"#),
    );
    let ctx = context(SITE, launch_ready_snapshot(), services);
    let result = Phase::Content.scorer().score(&ctx);
    assert_eq!(result.findings[0].message, "AI content analysis unavailable");
}

#[test]
fn content_improvement_titles_are_truncated() {
    let long = "a".repeat(120);
    let json = ANALYSIS_JSON.replace("Add customer logos under the hero", &long);
    let analysis = launch_ready::llm::analysis::parse_structured(&json).unwrap();
    let result = score_analysis(&analysis);
    assert_eq!(result.recommendations[0].title.chars().count(), 80);
    assert_eq!(result.recommendations[0].description, long);
}

#[test]
fn content_prompt_text_is_capped() {
    let html = format!("<p>{}</p>", "word ".repeat(2000));
    assert_eq!(content::prompt_text(&html).chars().count(), content::MAX_PROMPT_CHARS);
}

// ============================================================================
// 9. Monitoring
// ============================================================================

#[test]
fn monitoring_with_tools_and_robots() {
    let result = score_monitoring(&launch_ready_snapshot(), Some(ROBOTS_TXT));
    assert_eq!(result.score, 40 + 20 + 10 + 10);
    assert!(messages(&result).contains(&"Sentry detected"));
    assert!(messages(&result).contains(&"LogRocket detected"));
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.title == "Set up uptime monitoring")
    );
}

#[test]
fn monitoring_without_tools() {
    let result = score_monitoring(&bare_snapshot(), None);
    assert_eq!(result.score, 0);
    assert!(messages(&result).contains(&"No monitoring tools detected"));
    assert!(!messages(&result).contains(&"No error tracking"));
    assert!(result.recommendations.iter().any(|r| r.title == "Add error tracking"));
}

#[test]
fn monitoring_replay_without_error_tracking_warns() {
    let snapshot =
        snapshot_with(r#"<script src="https://static.hotjar.com/c/hotjar-1.js"></script>"#);
    let result = score_monitoring(&snapshot, None);
    assert_eq!(result.score, 20);
    assert!(messages(&result).contains(&"No error tracking"));
}

#[test]
fn monitoring_sitemap_from_html_link() {
    let snapshot = snapshot_with(r#"<link rel="sitemap" href="/sitemap.xml">"#);
    let result = score_monitoring(&snapshot, None);
    assert!(messages(&result).contains(&"Sitemap referenced"));
}

#[test]
fn monitoring_phase_fetches_robots() {
    let ctx = context(SITE, launch_ready_snapshot(), offline_services());
    let result = Phase::Monitoring.scorer().score(&ctx);
    assert!(messages(&result).contains(&"robots.txt found"));

    let ctx = context(SITE, launch_ready_snapshot(), services_with(StaticWebClient::new()));
    let result = Phase::Monitoring.scorer().score(&ctx);
    assert!(!messages(&result).contains(&"robots.txt found"));
}

#[test]
fn robots_url_uses_origin() {
    assert_eq!(
        robots_url("https://acme.dev/pricing?plan=pro#faq").as_deref(),
        Some("https://acme.dev/robots.txt")
    );
    assert_eq!(robots_url("not a url"), None);
}

// ============================================================================
// 10. Cross-phase properties
// ============================================================================

#[test]
fn every_phase_reports_bounded_scores() {
    for snapshot in [launch_ready_snapshot(), bare_snapshot(), PageSnapshot::failed("timeout")] {
        for scorer in default_scorers() {
            let ctx = context(SITE, snapshot.clone(), offline_services());
            let result = scorer.score(&ctx);
            assert_eq!(result.max_score, PHASE_MAX_SCORE, "{}", result.phase_name);
            assert!(result.score <= result.max_score, "{}", result.phase_name);
            assert_eq!(result.phase_name, scorer.phase().name());
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    for scorer in default_scorers() {
        let first = scorer.score(&context(SITE, launch_ready_snapshot(), offline_services()));
        let second = scorer.score(&context(SITE, launch_ready_snapshot(), offline_services()));
        assert_eq!(first, second, "{}", first.phase_name);
    }
}

#[test]
fn unloaded_snapshot_reports_could_not_load() {
    let snapshot = PageSnapshot::failed("navigation timeout");
    for phase in [Phase::Seo, Phase::Analytics, Phase::Social, Phase::Content, Phase::Monitoring] {
        let result = phase.scorer().score(&context(SITE, snapshot.clone(), offline_services()));
        assert_eq!(result.score, 0, "{}", phase.name());
        assert_eq!(result.findings[0].message, "Could not load page");
        assert_eq!(result.findings[0].details.as_deref(), Some("navigation timeout"));
    }
}

#[test]
fn unloaded_snapshot_does_not_affect_url_based_phases() {
    let snapshot = PageSnapshot::failed("navigation timeout");
    let domain = Phase::Domain.scorer().score(&context(SITE, snapshot.clone(), offline_services()));
    let security = Phase::Security.scorer().score(&context(SITE, snapshot, offline_services()));
    assert_eq!(domain.score, 100);
    assert_eq!(security.score, 100);
}

#[test]
fn unloaded_monitoring_still_suggests_uptime_checks() {
    let result = score_monitoring(&PageSnapshot::failed("dns"), None);
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].title, "Set up uptime monitoring");
}
