use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::browser::snapshot::PageSnapshot;
use crate::scanner::error::ScanError;

pub const DEFAULT_BROWSERLESS_ENDPOINT: &str = "https://chrome.browserless.io";

/// Extra time allowed on top of the navigation budget for the HTTP round-trip.
const TRANSPORT_SLACK: Duration = Duration::from_secs(5);

/// Produces the page snapshot a scan runs against.
///
/// Implementations never fail: every problem is reported through
/// `PageSnapshot::loaded == false` and `PageSnapshot::error`.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> PageSnapshot;
}

// ============================================================================
// Browserless — remote headless Chrome over its REST `/content` API
// ============================================================================

pub struct BrowserlessFetcher {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub navigation_timeout: Duration,
}

/// Body sent to `/content`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    goto_options: GotoOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    timeout: u64,
    wait_until: &'static str,
}

impl BrowserlessFetcher {
    pub fn new(endpoint: &str, api_key: Option<String>, navigation_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            navigation_timeout,
        }
    }

    fn try_fetch(&self, url: &str) -> Result<PageSnapshot, ScanError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ScanError::MissingCredential("BROWSERLESS_API_KEY"))?;

        let request = ContentRequest {
            url,
            goto_options: GotoOptions {
                timeout: self.navigation_timeout.as_millis() as u64,
                wait_until: "networkidle2",
            },
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.navigation_timeout + TRANSPORT_SLACK)
            .build()?;
        let response = client
            .post(format!("{}/content", self.endpoint))
            .query(&[("token", api_key)])
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text()?;
        if html.trim().is_empty() {
            return Err(ScanError::EmptyResponse("headless browser"));
        }
        Ok(PageSnapshot::from_html(html))
    }
}

impl PageFetcher for BrowserlessFetcher {
    fn fetch(&self, url: &str) -> PageSnapshot {
        match self.try_fetch(url) {
            Ok(snapshot) => {
                debug!(
                    url,
                    bytes = snapshot.html.len(),
                    scripts = snapshot.scripts.len(),
                    meta_tags = snapshot.meta_tags.len(),
                    "page snapshot captured"
                );
                snapshot
            }
            Err(e) => {
                warn!(url, error = %e, "page snapshot unavailable");
                PageSnapshot::failed(e.to_string())
            }
        }
    }
}

// ============================================================================
// Static fetcher (offline use and tests)
// ============================================================================

/// Returns the same snapshot for every URL.
pub struct StaticFetcher {
    pub snapshot: PageSnapshot,
}

impl StaticFetcher {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn html(html: &str) -> Self {
        Self::new(PageSnapshot::from_html(html))
    }
}

impl PageFetcher for StaticFetcher {
    fn fetch(&self, _url: &str) -> PageSnapshot {
        self.snapshot.clone()
    }
}
