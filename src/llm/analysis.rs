use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// Strict parsing of structured LLM output
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LlmParseError {
    #[error("no JSON object in response")]
    NoJsonObject,

    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("schema violation: {0}")]
    Invalid(String),
}

/// Schema rules a decoded response must satisfy beyond its shape.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Decode the first JSON object in `response` into `T` and validate it.
///
/// Markdown code fences are stripped first. Decoding starts at the first `{`
/// and reads exactly one JSON value, so trailing prose is ignored but an
/// unbalanced or truncated object is rejected.
pub fn parse_structured<T>(response: &str) -> Result<T, LlmParseError>
where
    T: DeserializeOwned + Validate,
{
    let body = strip_code_fence(response);
    let start = body.find('{').ok_or(LlmParseError::NoJsonObject)?;

    let value = serde_json::Deserializer::from_str(&body[start..])
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or(LlmParseError::NoJsonObject)?
        .map_err(LlmParseError::Malformed)?;

    if !value.is_object() {
        return Err(LlmParseError::NoJsonObject);
    }

    let parsed: T = serde_json::from_value(value).map_err(LlmParseError::Malformed)?;
    parsed.validate().map_err(LlmParseError::Invalid)?;
    Ok(parsed)
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) up to the end of the first line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

// ============================================================================
// Content analysis
// ============================================================================

/// Rating of one aspect of the page copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// 0..=100
    pub score: u32,
    pub feedback: String,
}

/// Model verdict on the landing page copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub score: u32,
    pub value_proposition: Assessment,
    pub headline: Assessment,
    pub cta: Assessment,
    pub social_proof: Assessment,
    pub readability: Assessment,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl ContentAnalysis {
    /// Labelled aspects in display order.
    pub fn aspects(&self) -> [(&'static str, &Assessment); 5] {
        [
            ("Value proposition", &self.value_proposition),
            ("Headline", &self.headline),
            ("Call to action", &self.cta),
            ("Social proof", &self.social_proof),
            ("Readability", &self.readability),
        ]
    }
}

impl Validate for ContentAnalysis {
    fn validate(&self) -> Result<(), String> {
        if self.score > 100 {
            return Err(format!("score {} exceeds 100", self.score));
        }
        for (label, aspect) in self.aspects() {
            if aspect.score > 100 {
                return Err(format!("{} score {} exceeds 100", label, aspect.score));
            }
            if aspect.feedback.trim().is_empty() {
                return Err(format!("{} feedback is empty", label));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Executive summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub summary: String,
    pub priorities: Vec<String>,
}

impl ExecutiveSummary {
    pub const MAX_PRIORITIES: usize = 3;

    /// Up to three non-empty, trimmed priorities.
    pub fn top_priorities(&self) -> Vec<String> {
        self.priorities
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .take(Self::MAX_PRIORITIES)
            .map(str::to_string)
            .collect()
    }
}

impl Validate for ExecutiveSummary {
    fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("summary is empty".to_string());
        }
        if self.top_priorities().is_empty() {
            return Err("no priorities listed".to_string());
        }
        Ok(())
    }
}
