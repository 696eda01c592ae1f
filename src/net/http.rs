use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::scanner::error::ScanError;

const USER_AGENT: &str = concat!("launch-ready/", env!("CARGO_PKG_VERSION"));

/// Status and headers of a response. Header names are lowercased; repeated
/// headers are joined with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl ResponseHeaders {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Secondary HTTP calls made by phase scorers.
///
/// Every call carries its own timeout so no phase can block indefinitely.
pub trait WebClient: Send + Sync {
    /// HEAD request; succeeds for any status the server answered with.
    fn head(&self, url: &str, timeout: Duration) -> Result<ResponseHeaders, ScanError>;

    /// GET request returning the body; non-2xx is an error.
    fn get_text(&self, url: &str, timeout: Duration) -> Result<String, ScanError>;
}

// ============================================================================
// reqwest-backed client
// ============================================================================

pub struct ReqwestWebClient {
    client: reqwest::blocking::Client,
}

impl ReqwestWebClient {
    pub fn new() -> Result<Self, ScanError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl WebClient for ReqwestWebClient {
    fn head(&self, url: &str, timeout: Duration) -> Result<ResponseHeaders, ScanError> {
        let response = self.client.head(url).timeout(timeout).send()?;

        let mut headers = ResponseHeaders::new(response.status().as_u16());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }
        Ok(headers)
    }

    fn get_text(&self, url: &str, timeout: Duration) -> Result<String, ScanError> {
        let response = self.client.get(url).timeout(timeout).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

// ============================================================================
// Static client (offline use and tests)
// ============================================================================

/// Serves canned headers and bodies. Unknown URLs answer 404; a missing
/// `headers` makes every HEAD fail with 503.
#[derive(Debug, Clone, Default)]
pub struct StaticWebClient {
    pub headers: Option<ResponseHeaders>,
    pub bodies: HashMap<String, String>,
}

impl StaticWebClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: ResponseHeaders) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

impl WebClient for StaticWebClient {
    fn head(&self, url: &str, _timeout: Duration) -> Result<ResponseHeaders, ScanError> {
        self.headers.clone().ok_or_else(|| ScanError::Status {
            url: url.to_string(),
            status: 503,
        })
    }

    fn get_text(&self, url: &str, _timeout: Duration) -> Result<String, ScanError> {
        self.bodies.get(url).cloned().ok_or_else(|| ScanError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
