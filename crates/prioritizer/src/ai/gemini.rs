//! Google Gemini provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_INFERENCE_BASE_URL;
use crate::errors::{PrioritizerError, PrioritizerResult};

use super::provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini content part
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Gemini conversation turn
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Gemini API request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Gemini API response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
    #[serde(default)]
    model_version: Option<String>,
}

/// Gemini API error
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

/// Google Gemini provider.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Split messages into the system instruction and conversation turns.
    fn convert_messages(messages: &[AIMessage]) -> (Option<Content>, Vec<Content>) {
        let mut system = None;
        let mut contents = Vec::new();

        for msg in messages {
            let role = match msg.role {
                AIRole::System => {
                    system = Some(Content {
                        role: None,
                        parts: vec![Part {
                            text: msg.content.clone(),
                        }],
                    });
                    continue;
                }
                AIRole::User => "user",
                AIRole::Assistant => "model",
            };
            contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            });
        }

        (system, contents)
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> PrioritizerResult<AIResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| PrioritizerError::Ai("Gemini API key not set".to_string()))?;

        let (system_instruction, contents) = Self::convert_messages(messages);

        let request = GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
                response_mime_type: options
                    .json_mode
                    .then(|| "application/json".to_string()),
            },
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_DANGEROUS_CONTENT",
                threshold: "BLOCK_NONE",
            }],
        };

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        tracing::debug!(model = %model, "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PrioritizerError::Ai(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PrioritizerError::Ai(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                let kind = error_response.error.status.unwrap_or_default();
                return Err(PrioritizerError::Ai(format!(
                    "Gemini API error ({status} {kind}): {}",
                    error_response.error.message
                )));
            }
            return Err(PrioritizerError::Ai(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let api_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| PrioritizerError::Ai(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| PrioritizerError::Ai("no response from model".to_string()))?;

        let usage = api_response.usage_metadata;
        Ok(AIResponse {
            text,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
            model: api_response
                .model_version
                .unwrap_or_else(|| model.to_string()),
            provider: "gemini".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let provider = GeminiProvider::new("key");
        assert_eq!(provider.name(), "gemini");
        assert!(provider.is_configured());
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            AIMessage::system("You are a task prioritization assistant"),
            AIMessage::user("Rank these"),
            AIMessage::assistant("[]"),
        ];

        let (system, contents) = GeminiProvider::convert_messages(&messages);

        assert_eq!(
            system.unwrap().parts[0].text,
            "You are a task prioritization assistant"
        );
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[1].role.as_deref(), Some("model"));
    }

    #[test]
    fn test_request_wire_format() {
        let request = GeminiRequest {
            contents: vec![],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: Some(0.1),
                max_output_tokens: Some(100),
                response_mime_type: Some("application/json".to_string()),
            },
            safety_settings: vec![],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 100);
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(value.get("systemInstruction").is_none());
    }
}
