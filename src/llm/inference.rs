use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scanner::error::ScanError;

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// One prompt/response exchange with a text model.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

/// A text-completion backend. Implementations must honour `request.timeout`.
pub trait TextInference: Send + Sync {
    fn infer_text(&self, request: &InferenceRequest) -> Result<String, ScanError>;
}

// ============================================================================
// OpenAI chat-completions backend
// ============================================================================

pub struct OpenAiBackend {
    pub endpoint: String,
    pub model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiBackend {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl TextInference for OpenAiBackend {
    fn infer_text(&self, request: &InferenceRequest) -> Result<String, ScanError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(request.timeout)
            .build()?;
        let url = format!("{}/chat/completions", self.endpoint);
        let response = client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let chat: ChatResponse = response.json()?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ScanError::EmptyResponse("language model"))
    }
}

// ============================================================================
// Test backends
// ============================================================================

/// Always answers with the same canned text.
pub struct MockTextInference {
    pub response: String,
}

impl MockTextInference {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl TextInference for MockTextInference {
    fn infer_text(&self, _request: &InferenceRequest) -> Result<String, ScanError> {
        Ok(self.response.clone())
    }
}

/// Always fails, as an unreachable or timed-out model would.
pub struct FailingInference;

impl TextInference for FailingInference {
    fn infer_text(&self, _request: &InferenceRequest) -> Result<String, ScanError> {
        Err(ScanError::EmptyResponse("language model"))
    }
}
