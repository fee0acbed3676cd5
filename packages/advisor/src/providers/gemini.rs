//! Google Gemini provider implementation.

use serde::{Deserialize, Serialize};

use super::{ChatProvider, ChatTurn};
use crate::AdvisorError;

/// Default hosted model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a provider for the default model and endpoint.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string(), DEFAULT_BASE_URL.to_string())
    }

    /// Creates a provider with an explicit model and base URL.
    #[must_use]
    pub fn with_model(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

/// Gemini API request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

/// Gemini API error response.
#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    async fn ask(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, AdvisorError> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.clone()),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: message.to_string(),
            }],
        });

        let request = GeminiRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents,
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let resp = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: GeminiError = serde_json::from_str(&body).unwrap_or_else(|_| GeminiError {
                error: GeminiErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(AdvisorError::Provider {
                message: err.error.message,
            });
        }

        let parsed: serde_json::Value = serde_json::from_str(&body)?;
        extract_answer(&parsed)
    }
}

/// Pulls the first candidate's concatenated text parts.
fn extract_answer(body: &serde_json::Value) -> Result<String, AdvisorError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AdvisorError::Provider {
            message: "response has no candidates".to_string(),
        })?;

    let text: Vec<&str> = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        return Err(AdvisorError::Provider {
            message: "candidate has no text parts".to_string(),
        });
    }
    Ok(text.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_candidate_text() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Plant maize after the first" }, { "text": "steady rains." }]
                }
            }]
        });
        assert_eq!(
            extract_answer(&body).unwrap(),
            "Plant maize after the first\nsteady rains."
        );
    }

    #[test]
    fn empty_candidates_are_a_provider_error() {
        let err = extract_answer(&serde_json::json!({ "candidates": [] })).unwrap_err();
        assert!(matches!(err, AdvisorError::Provider { .. }));
    }
}
