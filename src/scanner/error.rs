use crate::llm::analysis::LlmParseError;

/// Errors raised by the collaborators of a scan.
///
/// Phase scorers never surface these to the caller: they are converted into
/// findings and fallback scores at the phase boundary. `Scanner::scan` only
/// returns `Err` for an internal failure such as a panicking phase worker.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An API key needed for the call is not configured
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("unusable LLM response: {0}")]
    LlmParse(#[from] LlmParseError),

    #[error("empty response from {0}")]
    EmptyResponse(&'static str),

    /// A phase worker died without producing a result
    #[error("phase {phase} failed: {reason}")]
    PhaseFailed { phase: String, reason: String },
}

