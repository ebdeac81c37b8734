//! Text-generation collaborator client
//!
//! A thin client for an OpenAI-compatible chat-completions endpoint. The
//! core asks it two kinds of questions: structured extraction queries at
//! temperature 0 (heading selection, chain derivation, description
//! isolation) and nothing else. When structured output is requested but
//! the model misbehaves, the raw text is returned instead of an error —
//! call sites must handle the text shape.

use crate::config::Config;
use crate::{LlmError, LlmResult};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Per-query timeout for the model endpoint
const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// A model reply: parsed structured data, or raw text when structured
/// output was not requested or could not be parsed
#[derive(Debug, Clone)]
pub enum LlmReply {
    /// Output parsed as JSON
    Structured(Value),
    /// Raw (trimmed) model text
    Text(String),
}

impl LlmReply {
    /// Returns the parsed value if this reply is structured
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            LlmReply::Structured(value) => Some(value),
            LlmReply::Text(_) => None,
        }
    }
}

/// Chat-completions client for the configured model endpoint
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    config: Config,
}

impl LlmClient {
    /// Creates a client for the configured endpoint
    pub fn new(config: Config) -> LlmResult<Self> {
        let http = Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Unavailable {
                detail: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(LlmClient { http, config })
    }

    /// The model identifier this client queries
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Runs one model query and reports its token cost
    ///
    /// With `expect_structured`, Markdown code fences are stripped and
    /// the content is parsed as JSON; on parse failure a warning is
    /// logged and the raw text is returned instead — a malformed reply
    /// never aborts the query.
    ///
    /// # Errors
    ///
    /// * `Unavailable` - the endpoint could not be reached or answered
    ///   with a non-2xx status
    /// * `EmptyResponse` - the reply carried no content
    pub async fn query(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        expect_structured: bool,
    ) -> LlmResult<(LlmReply, u32)> {
        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = json!({
            "model": self.config.model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ]
        });

        tracing::debug!(model = %self.config.model, temperature, "querying model");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Unavailable {
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| LlmError::Unavailable {
            detail: format!("unreadable response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(LlmError::Unavailable {
                detail: format!("HTTP {}: {}", status, snippet(&body.to_string())),
            });
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        let tokens = token_usage(&body, content);
        tracing::debug!(tokens, "model query complete");

        let reply = if expect_structured {
            match parse_structured(content) {
                Ok(value) => LlmReply::Structured(value),
                Err(error) => {
                    tracing::warn!(
                        %error,
                        model = %self.config.model,
                        "expected structured model output; falling back to raw text"
                    );
                    LlmReply::Text(content.to_string())
                }
            }
        } else {
            LlmReply::Text(content.to_string())
        };

        Ok((reply, tokens))
    }
}

/// Parses model text as JSON after stripping Markdown code fences
pub fn parse_structured(text: &str) -> LlmResult<Value> {
    let stripped = strip_code_fences(text);
    serde_json::from_str(stripped).map_err(|_| LlmError::MalformedOutput {
        snippet: snippet(text),
    })
}

/// Removes a surrounding ```/```json fence, if present
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Extracts the token cost of a reply
///
/// Prefers `usage.total_tokens`, then the prompt/completion sum, and as
/// a last resort estimates from the content's word count so callers
/// always get a non-negative figure.
fn token_usage(body: &Value, content: &str) -> u32 {
    let usage = body.get("usage");

    if let Some(total) = usage
        .and_then(|u| u.get("total_tokens"))
        .and_then(Value::as_u64)
    {
        return total as u32;
    }

    if let Some(usage) = usage {
        let prompt = usage
            .get("prompt_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let completion = usage
            .get("completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if prompt + completion > 0 {
            return (prompt + completion) as u32;
        }
    }

    content.split_whitespace().count() as u32
}

/// Clips a string for error messages
fn snippet(text: &str) -> String {
    const LIMIT: usize = 160;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(LIMIT).collect();
        format!("{}...", clipped)
    }
}
