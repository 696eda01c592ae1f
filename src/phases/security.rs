use reqwest::Url;
use tracing::warn;

use crate::net::http::ResponseHeaders;
use crate::phases::{Phase, PhaseContext, PhaseScorer, Scorecard};
use crate::scanner::model::{Finding, PhaseResult, Priority, Recommendation};

pub const HTTPS_POINTS: u32 = 30;
/// Floor applied when headers cannot be fetched
pub const HTTPS_FLOOR: u32 = 40;
pub const PLAIN_HTTP_FLOOR: u32 = 10;

/// One security header check.
struct HeaderCheck {
    label: &'static str,
    points: u32,
    priority: Priority,
    present: fn(&ResponseHeaders) -> bool,
    why: &'static str,
    fix: &'static str,
}

const HEADER_CHECKS: [HeaderCheck; 7] = [
    HeaderCheck {
        label: "Strict-Transport-Security (HSTS)",
        points: 15,
        priority: Priority::Medium,
        present: |h| h.get("strict-transport-security").is_some(),
        why: "HSTS stops browsers from ever connecting over plain HTTP.",
        fix: "Send Strict-Transport-Security: max-age=31536000; includeSubDomains",
    },
    HeaderCheck {
        label: "Clickjacking protection",
        points: 10,
        priority: Priority::Medium,
        present: has_frame_protection,
        why: "Without it your pages can be framed by other sites.",
        fix: "Send X-Frame-Options: DENY or a CSP frame-ancestors directive.",
    },
    HeaderCheck {
        label: "X-Content-Type-Options: nosniff",
        points: 10,
        priority: Priority::Low,
        present: |h| {
            h.get("x-content-type-options")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("nosniff"))
        },
        why: "Stops browsers from MIME-sniffing responses into executable types.",
        fix: "Send X-Content-Type-Options: nosniff",
    },
    HeaderCheck {
        label: "Content-Security-Policy",
        points: 15,
        priority: Priority::Medium,
        present: |h| h.get("content-security-policy").is_some(),
        why: "A CSP is the strongest defence against cross-site scripting.",
        fix: "Start with Content-Security-Policy-Report-Only, then enforce a policy.",
    },
    HeaderCheck {
        label: "X-XSS-Protection",
        points: 5,
        priority: Priority::Low,
        present: |h| h.get("x-xss-protection").is_some(),
        why: "Older browsers use it to block reflected XSS.",
        fix: "Send X-XSS-Protection: 1; mode=block",
    },
    HeaderCheck {
        label: "Referrer-Policy",
        points: 5,
        priority: Priority::Low,
        present: |h| h.get("referrer-policy").is_some(),
        why: "Controls how much of your URLs leak to other sites.",
        fix: "Send Referrer-Policy: strict-origin-when-cross-origin",
    },
    HeaderCheck {
        label: "Permissions-Policy",
        points: 10,
        priority: Priority::Low,
        present: |h| h.get("permissions-policy").is_some(),
        why: "Restricts which browser features (camera, geolocation...) pages may use.",
        fix: "Send Permissions-Policy: camera=(), microphone=(), geolocation=()",
    },
];

fn has_frame_protection(headers: &ResponseHeaders) -> bool {
    headers.get("x-frame-options").is_some()
        || headers
            .get("content-security-policy")
            .is_some_and(|csp| csp.to_ascii_lowercase().contains("frame-ancestors"))
}

/// HTTPS plus security response headers from a HEAD request.
pub struct SecurityPhase;

impl PhaseScorer for SecurityPhase {
    fn phase(&self) -> Phase {
        Phase::Security
    }

    fn score(&self, ctx: &PhaseContext) -> PhaseResult {
        let headers = ctx.services.web.head(&ctx.url, ctx.services.timeouts.headers);
        let headers = headers.map_err(|e| {
            warn!(url = %ctx.url, error = %e, "security header fetch failed");
            e.to_string()
        });
        score_security(&ctx.url, headers)
    }
}

/// Score from the URL scheme and the outcome of the header fetch.
pub fn score_security(url: &str, headers: Result<ResponseHeaders, String>) -> PhaseResult {
    let https = Url::parse(url).is_ok_and(|u| u.scheme() == "https");
    let mut card = Scorecard::default();

    if https {
        card.award(HTTPS_POINTS, Finding::success("Served over HTTPS"));
    } else {
        card.note(Finding::error("Not served over HTTPS"));
        card.recommend(Recommendation::high(
            "Enable HTTPS",
            "Traffic over plain HTTP can be read and modified in transit.",
            "Install a TLS certificate and redirect all HTTP requests to HTTPS.",
        ));
    }

    match headers {
        Ok(headers) => {
            for check in &HEADER_CHECKS {
                if (check.present)(&headers) {
                    card.award(check.points, Finding::success(format!("{} enabled", check.label)));
                } else {
                    card.note(Finding::warning(format!("{} missing", check.label)));
                    card.recommend(Recommendation::new(
                        check.priority,
                        format!("Add {}", check.label),
                        check.why,
                        check.fix,
                    ));
                }
            }
        }
        Err(reason) => {
            card.note(Finding::warning("Could not fetch security headers").with_details(reason));
            let floor = if https { HTTPS_FLOOR } else { PLAIN_HTTP_FLOOR };
            card.score = card.score.max(floor);
        }
    }

    card.finish(Phase::Security)
}
