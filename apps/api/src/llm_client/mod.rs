/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API
/// directly. All LLM interactions MUST go through this module.
use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Candidate models in fallback order: higher-capability first, the
/// cheaper/faster model as the quota fallback. Each candidate is tried
/// exactly once, with no delay between attempts.
pub const MODEL_FALLBACK: &[&str] = &["gemini-1.5-pro", "gemini-1.5-flash"];

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("All models failed due to quota or errors")]
    AllModelsFailed,
}

impl LlmError {
    /// Quota exhaustion as the provider reports it: HTTP 429. Classified on
    /// the typed status, never by searching the rendered message.
    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::Api { status: 429, .. })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateResponse {
    /// Extracts the text from the first candidate's first text part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// A successful generation: the response text plus the model that produced it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: &'static str,
}

/// The single LLM client used by all services.
/// Wraps the Gemini generateContent API with an ordered model-fallback chain.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Runs the prompt against the candidate chain. The first model to
    /// answer wins; a quota rejection moves on to the next candidate, any
    /// other failure is returned immediately.
    pub async fn generate(&self, prompt: &str) -> Result<Completion, LlmError> {
        try_in_order(MODEL_FALLBACK, LlmError::is_quota, |model| {
            self.call_model(model, prompt)
        })
        .await
    }

    /// Makes a single generateContent call against one model.
    async fn call_model(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{model}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the error envelope for a readable message
            let message = serde_json::from_str::<GoogleError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generate_response: GenerateResponse = response.json().await?;

        if let Some(usage) = &generate_response.usage_metadata {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
                model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        generate_response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

/// First success wins across an ordered candidate list. `retryable` decides
/// whether a failure moves on to the next candidate or is returned as-is;
/// an exhausted list is `AllModelsFailed`. Each candidate is called once.
async fn try_in_order<F, Fut>(
    models: &[&'static str],
    retryable: impl Fn(&LlmError) -> bool,
    mut call: F,
) -> Result<Completion, LlmError>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    for &model in models {
        match call(model).await {
            Ok(text) => return Ok(Completion { text, model }),
            Err(e) if retryable(&e) => {
                warn!("Quota limit reached for {model}, switching to next model... ({e})");
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(LlmError::AllModelsFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota_error() -> LlmError {
        LlmError::Api {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        }
    }

    #[test]
    fn test_is_quota_on_429() {
        assert!(quota_error().is_quota());
    }

    #[test]
    fn test_is_quota_rejects_other_statuses() {
        let err = LlmError::Api {
            status: 500,
            message: "internal".to_string(),
        };
        assert!(!err.is_quota());
        assert!(!LlmError::EmptyContent.is_quota());
        assert!(!LlmError::AllModelsFailed.is_quota());
    }

    #[test]
    fn test_is_quota_ignores_message_content() {
        // A non-429 error mentioning "429" in its message must not be
        // classified as quota.
        let err = LlmError::Api {
            status: 400,
            message: "model returned code 429 in body".to_string(),
        };
        assert!(!err.is_quota());
    }

    #[tokio::test]
    async fn test_fallback_advances_past_quota_error() {
        let mut calls = Vec::new();
        let completion = try_in_order(&["primary", "fallback"], LlmError::is_quota, |model| {
            calls.push(model);
            async move {
                if model == "primary" {
                    Err(quota_error())
                } else {
                    Ok("answer".to_string())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(completion.model, "fallback");
        assert_eq!(completion.text, "answer");
        assert_eq!(calls, vec!["primary", "fallback"]);
    }

    #[tokio::test]
    async fn test_non_quota_error_propagates_without_further_attempts() {
        let mut calls = Vec::new();
        let result = try_in_order(&["primary", "fallback"], LlmError::is_quota, |model| {
            calls.push(model);
            async move {
                Err::<String, _>(LlmError::Api {
                    status: 400,
                    message: "bad request".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Api { status: 400, .. })));
        assert_eq!(calls, vec!["primary"]);
    }

    #[tokio::test]
    async fn test_exhausted_candidates_is_all_models_failed() {
        let result = try_in_order(&["primary", "fallback"], LlmError::is_quota, |_| async {
            Err::<String, _>(quota_error())
        })
        .await;

        assert!(matches!(result, Err(LlmError::AllModelsFailed)));
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut calls = Vec::new();
        let completion = try_in_order(&["primary", "fallback"], LlmError::is_quota, |model| {
            calls.push(model);
            async move { Ok(format!("from {model}")) }
        })
        .await
        .unwrap();

        assert_eq!(completion.model, "primary");
        assert_eq!(completion.text, "from primary");
        assert_eq!(calls, vec!["primary"]);
    }
}
