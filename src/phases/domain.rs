use std::net::IpAddr;

use reqwest::Url;

use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard};
use crate::scanner::model::{Finding, PhaseResult, Recommendation};

pub const HTTPS_POINTS: u32 = 30;
pub const VALID_HOST_POINTS: u32 = 20;
pub const WWW_POINTS: u32 = 15;
pub const APEX_POINTS: u32 = 10;
pub const REACHABLE_POINTS: u32 = 35;

/// HTTPS, hostname and www configuration. Works from the URL alone.
pub struct DomainPhase;

impl PhaseScorer for DomainPhase {
    fn phase(&self) -> Phase {
        Phase::Domain
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        score_domain(&ctx.url)
    }
}

pub fn score_domain(raw_url: &str) -> PhaseResult {
    let url = match Url::parse(raw_url) {
        Ok(url) if url.host_str().is_some() => url,
        Ok(_) => return invalid(raw_url, "URL has no host"),
        Err(e) => return invalid(raw_url, &e.to_string()),
    };
    let host = url.host_str().unwrap_or_default();
    let mut card = Scorecard::default();

    if url.scheme() == "https" {
        card.award(HTTPS_POINTS, Finding::success("HTTPS enabled"));
    } else {
        card.note(Finding::error("HTTPS not enabled").with_details(format!("Scheme is {}", url.scheme())));
        card.recommend(Recommendation::high(
            "Enable HTTPS",
            "Browsers flag plain HTTP sites as not secure and search engines rank them lower.",
            "Install a TLS certificate (e.g. Let's Encrypt) and redirect all HTTP traffic to HTTPS.",
        ));
    }

    if is_public_hostname(host) {
        card.award(VALID_HOST_POINTS, Finding::success("Custom domain configured").with_details(host));
    } else {
        card.note(
            Finding::warning("Site is served from localhost or a raw IP address").with_details(host),
        );
        card.recommend(Recommendation::high(
            "Use a custom domain",
            "Visitors and search engines expect a memorable, branded domain name.",
            "Register a domain and point its DNS records at your hosting provider.",
        ));
    }

    if host.starts_with("www.") {
        card.award(WWW_POINTS, Finding::success("www subdomain configured"));
    } else {
        card.award(
            APEX_POINTS,
            Finding::success("Apex domain in use").with_details(format!("No www. prefix on {}", host)),
        );
        card.recommend(Recommendation::low(
            "Configure a www redirect",
            "Visitors often type the www. variant of a domain.",
            format!("Redirect www.{} to {} (or the reverse) with a permanent 301.", host, host),
        ));
    }

    card.award(REACHABLE_POINTS, Finding::success("Domain is reachable"));

    card.finish(Phase::Domain)
}

fn invalid(raw_url: &str, reason: &str) -> PhaseResult {
    PhaseResult::new(
        Phase::Domain.name(),
        0,
        vec![Finding::error("Invalid URL").with_details(format!("{}: {}", raw_url, reason))],
        vec![],
    )
}

/// True for a hostname that is neither localhost nor an IP literal.
pub fn is_public_hostname(host: &str) -> bool {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return false;
    }
    let lower = bare.to_ascii_lowercase();
    !(lower == "localhost" || lower.ends_with(".localhost"))
}
