//! Gemini AI provider implementation.
//!
//! Implements model discovery and text generation against Google's
//! generative-language REST API.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model identifiers in order of preference. The first one available on
/// the account wins; if none are, the first chat-capable Gemini model is
/// used instead.
const PREFERRED_MODELS: [&str; 3] = [
    "models/gemini-1.5-pro",
    "models/gemini-pro",
    "models/gemini-1.0-pro",
];

/// Fixed generation parameters for persona responses.
pub fn persona_generation_params() -> GenerationParams {
    GenerationParams {
        temperature: Some(0.7),
        top_p: Some(0.95),
        top_k: Some(40),
        max_tokens: Some(800),
    }
}

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    params: GenerationParams,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            params: persona_generation_params(),
            client,
        }
    }

    /// Authenticate, enumerate the account's models, and construct a
    /// provider bound to the best available one.
    ///
    /// This runs once at startup. Every failure mode (bad key, network,
    /// no capable models) surfaces as a `ProviderError` so the caller
    /// can degrade to fallback-only mode.
    pub async fn discover(api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        let url = format!("{}/models?key={}", GEMINI_API_BASE, api_key);
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "Model listing failed {}: {}",
                status, error_text
            )));
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse model list: {}", e)))?;

        tracing::info!(count = listing.models.len(), "Listed available models");

        let model = select_model(&listing.models).ok_or_else(|| {
            ProviderError::NotConfigured("No chat-capable Gemini models available".to_string())
        })?;

        tracing::info!(model = %model, "Selected Gemini model");

        Ok(Self::new(GeminiConfig {
            api_key: api_key.to_string(),
            model,
            timeout,
        }))
    }

    /// Build the API URL for the given method on the bound model.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }

    fn build_generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            top_k: self.params.top_k,
            max_output_tokens: self.params.max_tokens,
        }
    }
}

/// Pick the model to bind: first preferred identifier that the account
/// can use, else the first chat-capable Gemini model.
fn select_model(models: &[ModelInfo]) -> Option<String> {
    let capable: Vec<&str> = models
        .iter()
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
                && m.name.contains("gemini")
        })
        .map(|m| m.name.as_str())
        .collect();

    PREFERRED_MODELS
        .iter()
        .copied()
        .find(|preferred| capable.contains(preferred))
        .map(str::to_string)
        .or_else(|| capable.first().map(|s| s.to_string()))
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(self.build_generation_config()),
            safety_settings: Some(default_safety_settings()),
        };

        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let (text, finish_reason) = extract_reply(&api_response);

        if finish_reason == FinishReason::ContentFilter {
            return Err(ProviderError::ContentFiltered);
        }

        Ok(ProviderResponse {
            text,
            finish_reason,
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Pull the first candidate's first text part out of a response, along
/// with the mapped finish reason.
fn extract_reply(response: &GenerateContentResponse) -> (Option<String>, FinishReason) {
    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.clone())
        .filter(|t| !t.is_empty());

    let finish_reason = response
        .candidates
        .first()
        .map(|c| match c.finish_reason.as_deref() {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") => FinishReason::ContentFilter,
            _ => FinishReason::Complete,
        })
        .unwrap_or(FinishReason::Complete);

    (text, finish_reason)
}

/// All four harm categories at BLOCK_ONLY_HIGH.
fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_ONLY_HIGH".to_string(),
    })
    .collect()
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn selects_preferred_model_when_available() {
        let models = vec![
            model("models/gemini-1.0-pro", &["generateContent"]),
            model("models/gemini-1.5-pro", &["generateContent"]),
            model("models/embedding-001", &["embedContent"]),
        ];
        assert_eq!(
            select_model(&models).as_deref(),
            Some("models/gemini-1.5-pro")
        );
    }

    #[test]
    fn falls_back_to_first_capable_model() {
        let models = vec![
            model("models/gemini-2.0-flash", &["generateContent"]),
            model("models/gemini-2.0-pro-exp", &["generateContent"]),
        ];
        assert_eq!(
            select_model(&models).as_deref(),
            Some("models/gemini-2.0-flash")
        );
    }

    #[test]
    fn skips_non_chat_and_non_gemini_models() {
        let models = vec![
            model("models/embedding-001", &["embedContent"]),
            model("models/imagen-3", &["generateContent"]),
        ];
        assert_eq!(select_model(&models), None);
    }

    #[test]
    fn extracts_text_from_first_candidate() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Dharma is duty."}]},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let (text, finish_reason) = extract_reply(&response);
        assert_eq!(text.as_deref(), Some("Dharma is duty."));
        assert_eq!(finish_reason, FinishReason::Complete);
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let (text, finish_reason) = extract_reply(&response);
        assert_eq!(text, None);
        assert_eq!(finish_reason, FinishReason::Complete);
    }

    #[test]
    fn safety_block_is_reported() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": []},
                "finishReason": "SAFETY"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let (text, finish_reason) = extract_reply(&response);
        assert_eq!(text, None);
        assert_eq!(finish_reason, FinishReason::ContentFilter);
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.7),
                top_p: Some(0.95),
                top_k: Some(40),
                max_output_tokens: Some(800),
            }),
            safety_settings: Some(default_safety_settings()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 800);
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(
            json["safetySettings"][0]["threshold"],
            "BLOCK_ONLY_HIGH"
        );
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
    }
}
