use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scanner::error::ScanError;

pub const DEFAULT_PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Lab metrics from one Lighthouse performance run.
///
/// Times are in milliseconds; `cls` is unitless. A metric is `None` when the
/// run did not report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LighthouseMetrics {
    /// Lighthouse performance category, 0..=100
    pub performance_score: u32,
    pub lcp_ms: Option<f64>,
    pub tbt_ms: Option<f64>,
    pub cls: Option<f64>,
    pub speed_index_ms: Option<f64>,
    pub fcp_ms: Option<f64>,
}

/// A Lighthouse-style page-speed service.
pub trait PageSpeedApi: Send + Sync {
    fn run(&self, url: &str) -> Result<LighthouseMetrics, ScanError>;
}

// ============================================================================
// Google PageSpeed Insights v5
// ============================================================================

pub struct GooglePageSpeed {
    pub endpoint: String,
    pub api_key: String,
    /// `mobile` or `desktop`
    pub strategy: String,
    pub timeout: Duration,
}

impl GooglePageSpeed {
    pub fn new(endpoint: &str, api_key: &str, strategy: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            strategy: strategy.to_string(),
            timeout,
        }
    }
}

impl PageSpeedApi for GooglePageSpeed {
    fn run(&self, url: &str) -> Result<LighthouseMetrics, ScanError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client
            .get(&self.endpoint)
            .query(&[
                ("url", url),
                ("key", self.api_key.as_str()),
                ("category", "performance"),
                ("strategy", self.strategy.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        parse_pagespeed_response(&response.text()?)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageSpeedResponse {
    lighthouse_result: LighthouseResult,
}

#[derive(Deserialize)]
struct LighthouseResult {
    categories: Categories,
    #[serde(default)]
    audits: HashMap<String, Audit>,
}

#[derive(Deserialize)]
struct Categories {
    performance: Category,
}

#[derive(Deserialize)]
struct Category {
    score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Audit {
    numeric_value: Option<f64>,
}

/// Decode a PageSpeed Insights v5 JSON body into metrics.
pub fn parse_pagespeed_response(body: &str) -> Result<LighthouseMetrics, ScanError> {
    let response: PageSpeedResponse = serde_json::from_str(body)?;
    let result = response.lighthouse_result;

    let score = result
        .categories
        .performance
        .score
        .ok_or(ScanError::EmptyResponse("PageSpeed performance category"))?;

    let audit = |id: &str| result.audits.get(id).and_then(|a| a.numeric_value);

    Ok(LighthouseMetrics {
        performance_score: (score.clamp(0.0, 1.0) * 100.0).round() as u32,
        lcp_ms: audit("largest-contentful-paint"),
        tbt_ms: audit("total-blocking-time"),
        cls: audit("cumulative-layout-shift"),
        speed_index_ms: audit("speed-index"),
        fcp_ms: audit("first-contentful-paint"),
    })
}

// ============================================================================
// Static service (offline use and tests)
// ============================================================================

/// Returns fixed metrics, or fails every run when `metrics` is `None`.
pub struct StaticPageSpeed {
    pub metrics: Option<LighthouseMetrics>,
}

impl PageSpeedApi for StaticPageSpeed {
    fn run(&self, url: &str) -> Result<LighthouseMetrics, ScanError> {
        self.metrics.clone().ok_or_else(|| ScanError::Status {
            url: url.to_string(),
            status: 500,
        })
    }
}
