//! Chat-completion client for OpenAI-compatible routers.
//!
//! One outbound call per example, sequential, with retry on transient
//! failure. The API key is resolved once at construction from the router's
//! environment variable and never logged.

use crate::config::Config;
use crate::log_debug;
use crate::routers::{Router, RouterSettings};

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

/// Total attempts per generation: the initial call plus two retries
const MAX_ATTEMPTS: usize = 3;

/// Fixed system message sent with every request
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Errors raised by the LLM client
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{env_var} environment variable is required to call the {router} API")]
    MissingApiKey { router: String, env_var: String },
    #[error("invalid header in router configuration: {0}")]
    InvalidHeader(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{router} request failed: {source}")]
    Request {
        router: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{router} returned HTTP {status}: {body}")]
    Status {
        router: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Whether a failed attempt is worth retrying.
    ///
    /// Transport errors, non-2xx statuses, and malformed or empty
    /// completion payloads are transient; configuration errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::Status { .. } | Self::MalformedResponse(_)
        )
    }
}

/// One completed generation
#[derive(Debug, Clone)]
pub struct LlmResult {
    /// Trimmed text content of the first completion choice
    pub sql: String,
    /// Full response payload, kept for debugging
    pub raw: serde_json::Value,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

/// Completion content arrives either as a plain string or as a list of
/// typed parts, depending on the upstream provider.
#[derive(Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Client for an OpenAI-compatible chat-completion endpoint
pub struct SqlLlmClient {
    http: reqwest::Client,
    settings: RouterSettings,
    router_name: String,
}

impl SqlLlmClient {
    /// Build a client for `router`, resolving the API key from the
    /// router's environment variable unless an explicit key is given.
    pub fn new(router: Router, api_key: Option<String>, config: &Config) -> Result<Self, LlmError> {
        let settings = RouterSettings::for_router(router, config);
        Self::from_settings(
            router.name(),
            settings,
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Build a client from fully resolved settings.
    ///
    /// Split out from [`Self::new`] so tests can point the client at a
    /// local endpoint.
    pub fn from_settings(
        router_name: &str,
        settings: RouterSettings,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .or_else(|| {
                std::env::var(&settings.api_key_env)
                    .ok()
                    .filter(|key| !key.is_empty())
            })
            .ok_or_else(|| LlmError::MissingApiKey {
                router: router_name.to_string(),
                env_var: settings.api_key_env.clone(),
            })?;
        log_debug!(
            "Initialising LLM client for router '{router_name}' (key from {})",
            settings.api_key_env
        );

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| LlmError::InvalidHeader("authorization".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        for (name, value) in &settings.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| LlmError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| LlmError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(LlmError::Client)?;

        Ok(Self {
            http,
            settings,
            router_name: router_name.to_string(),
        })
    }

    /// Name of the router this client targets
    pub fn router_name(&self) -> &str {
        &self.router_name
    }

    /// Generate SQL for `prompt` using `model`.
    ///
    /// Transient failures are retried with exponential backoff (1s
    /// doubling, capped at 20s) up to three attempts total; the last
    /// error is surfaced once attempts are exhausted.
    pub async fn generate(&self, prompt: &str, model: &str) -> Result<LlmResult, LlmError> {
        log_debug!("Calling router '{}' with model {model}", self.router_name);
        log_debug!("Model prompt: {prompt}");

        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor(500)
            .max_delay(Duration::from_secs(20))
            .take(MAX_ATTEMPTS - 1);

        RetryIf::spawn(
            retry_strategy,
            || self.try_generate(prompt, model),
            LlmError::is_transient,
        )
        .await
    }

    /// One attempt: send the request and normalize the response
    async fn try_generate(&self, prompt: &str, model: &str) -> Result<LlmResult, LlmError> {
        let request = ChatRequest {
            model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                router: self.router_name.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_debug!("Router '{}' returned HTTP {status}", self.router_name);
            return Err(LlmError::Status {
                router: self.router_name.clone(),
                status,
                body,
            });
        }

        let raw: serde_json::Value =
            response.json().await.map_err(|source| LlmError::Request {
                router: self.router_name.clone(),
                source,
            })?;
        let completion: ChatResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let sql = normalize_content(&completion)?;
        log_debug!("Received SQL: {sql}");
        Ok(LlmResult { sql, raw })
    }
}

/// Reduce a completion to its text content.
///
/// The first choice's message content is used; part lists are concatenated
/// in order, keeping only `"text"`-typed parts.
fn normalize_content(completion: &ChatResponse) -> Result<String, LlmError> {
    let choice = completion.choices.first().ok_or_else(|| {
        LlmError::MalformedResponse("no choices returned from completion response".to_string())
    })?;

    let content = choice.message.content.as_ref().ok_or_else(|| {
        LlmError::MalformedResponse("no content in completion response".to_string())
    })?;

    let text = match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => {
            let text_parts: Vec<&str> = parts
                .iter()
                .filter(|part| part.kind == "text" && !part.text.is_empty())
                .map(|part| part.text.as_str())
                .collect();
            if text_parts.is_empty() {
                return Err(LlmError::MalformedResponse(
                    "completion content did not contain text parts".to_string(),
                ));
            }
            text_parts.concat()
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LlmError::MalformedResponse(
            "no content in completion response".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(json: serde_json::Value) -> ChatResponse {
        serde_json::from_value(json).expect("valid completion fixture")
    }

    #[test]
    fn test_normalize_string_content() {
        let response = completion(serde_json::json!({
            "choices": [{"message": {"content": "  SELECT 1  "}}]
        }));
        assert_eq!(normalize_content(&response).expect("text"), "SELECT 1");
    }

    #[test]
    fn test_normalize_part_list_content() {
        let response = completion(serde_json::json!({
            "choices": [{"message": {"content": [
                {"type": "text", "text": "SELECT a "},
                {"type": "image", "text": "ignored"},
                {"type": "text", "text": "FROM b"}
            ]}}]
        }));
        assert_eq!(normalize_content(&response).expect("text"), "SELECT a FROM b");
    }

    #[test]
    fn test_normalize_rejects_empty_choices() {
        let response = completion(serde_json::json!({"choices": []}));
        let err = normalize_content(&response).expect_err("should fail");
        assert!(matches!(err, LlmError::MalformedResponse(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_normalize_rejects_missing_content() {
        let response = completion(serde_json::json!({
            "choices": [{"message": {"content": null}}]
        }));
        assert!(normalize_content(&response).is_err());
    }

    #[test]
    fn test_normalize_rejects_non_text_parts() {
        let response = completion(serde_json::json!({
            "choices": [{"message": {"content": [{"type": "image", "text": ""}]}}]
        }));
        assert!(normalize_content(&response).is_err());
    }

    #[test]
    fn test_error_classification() {
        let config_err = LlmError::MissingApiKey {
            router: "openrouter".to_string(),
            env_var: "OPENROUTER_API_KEY".to_string(),
        };
        assert!(!config_err.is_transient());

        let malformed = LlmError::MalformedResponse("empty".to_string());
        assert!(malformed.is_transient());
    }
}
