//! Gemini gateway for multimodal generation.
//!
//! This module talks to the `generateContent` endpoint of the Gemini API with a single
//! non-streaming request per call.

use crate::error::{PhysiSolveError, Result};
use crate::llm::gateway::{GenerationConfig, LlmGateway};
use crate::llm::models::{ContentPart, LlmGatewayResponse, MultimodalRequest, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for connecting to the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Gateway for the Gemini generative language service.
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Create a new Gemini gateway with custom configuration.
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PhysiSolveError::ConfigError(
                "Gemini API key is empty".to_string(),
            ));
        }

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().map_err(|e| {
            PhysiSolveError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(GeminiConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    async fn generate(
        &self,
        model: &str,
        request: &MultimodalRequest,
        config: &GenerationConfig,
    ) -> Result<LlmGatewayResponse> {
        info!("Delegating to Gemini for generation");
        debug!("Model: {}, part count: {}", model, request.parts.len());

        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": adapt_parts_to_gemini(request),
            }]
        });

        if let Some(generation_config) = extract_generation_config(config) {
            body["generationConfig"] = generation_config;
        }

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PhysiSolveError::GatewayError(describe_api_error(status, &text)));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let reply = parse_generate_response(parsed);

        if let Some(usage) = &reply.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                response_tokens = usage.response_tokens,
                thinking_tokens = usage.thinking_tokens,
                "Gemini usage"
            );
        }

        let has_text = reply.content.as_deref().is_some_and(|t| !t.trim().is_empty());
        if has_text {
            return Ok(reply);
        }

        let reason = reply.finish_reason.unwrap_or_else(|| "no text returned".to_string());
        warn!("Gemini returned no text: {}", reason);
        Err(PhysiSolveError::EmptyResponse(reason))
    }
}

fn adapt_parts_to_gemini(request: &MultimodalRequest) -> Vec<Value> {
    request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Image(image) => serde_json::json!({
                "inlineData": {
                    "mimeType": image.media_type,
                    "data": image.data,
                }
            }),
            ContentPart::Text(text) => serde_json::json!({ "text": text }),
        })
        .collect()
}

fn extract_generation_config(config: &GenerationConfig) -> Option<Value> {
    if config.is_empty() {
        return None;
    }

    let mut generation_config = serde_json::json!({});

    if let Some(temperature) = config.temperature {
        generation_config["temperature"] = serde_json::json!(temperature);
    }
    if let Some(max_output_tokens) = config.max_output_tokens {
        generation_config["maxOutputTokens"] = serde_json::json!(max_output_tokens);
    }
    if let Some(budget) = config.thinking_budget {
        generation_config["thinkingConfig"] = serde_json::json!({ "thinkingBudget": budget });
    }

    Some(generation_config)
}

fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let label = envelope.error.status.unwrap_or_else(|| status.to_string());
            format!("{}: {}", label, envelope.error.message)
        }
        Err(_) => format!("Gemini API error: {}", status),
    }
}

fn parse_generate_response(response: GenerateContentResponse) -> LlmGatewayResponse {
    let usage = response.usage_metadata.map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count.unwrap_or(0),
        response_tokens: u.candidates_token_count.unwrap_or(0),
        thinking_tokens: u.thoughts_token_count.unwrap_or(0),
    });

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r));
        return LlmGatewayResponse {
            content: None,
            finish_reason: reason,
            usage,
        };
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();

    LlmGatewayResponse {
        content: if text.is_empty() { None } else { Some(text) },
        finish_reason: candidate.finish_reason,
        usage,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    thoughts_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::EncodedImagePart;

    fn request() -> MultimodalRequest {
        MultimodalRequest::new(
            EncodedImagePart {
                data: "QUJD".to_string(),
                media_type: "image/png".to_string(),
            },
            "Solve",
        )
    }

    fn gateway(url: String) -> GeminiGateway {
        GeminiGateway::with_api_key_and_base_url("test-key", url).unwrap()
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = GeminiGateway::with_api_key_and_base_url("  ", DEFAULT_BASE_URL);
        assert!(matches!(result, Err(PhysiSolveError::ConfigError(_))));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig {
            api_key: "secret-123".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-123"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = gateway("http://localhost:1234/v1beta/".to_string());
        assert_eq!(
            gateway.endpoint("gemini-2.5-flash"),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_adapt_parts_image_first() {
        let parts = adapt_parts_to_gemini(&request());

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
        assert_eq!(parts[1]["text"], "Solve");
    }

    #[test]
    fn test_extract_generation_config_default() {
        let value = extract_generation_config(&GenerationConfig::default()).unwrap();
        assert_eq!(value["thinkingConfig"]["thinkingBudget"], 2048);
        assert!(value.get("temperature").is_none());
        assert!(value.get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_extract_generation_config_all_fields() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            max_output_tokens: Some(1000),
            thinking_budget: Some(0),
        };
        let value = extract_generation_config(&config).unwrap();
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["maxOutputTokens"], 1000);
        assert_eq!(value["thinkingConfig"]["thinkingBudget"], 0);
    }

    #[test]
    fn test_extract_generation_config_none() {
        let config = GenerationConfig {
            temperature: None,
            max_output_tokens: None,
            thinking_budget: None,
        };
        assert!(extract_generation_config(&config).is_none());
    }

    #[test]
    fn test_describe_api_error_with_payload() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let message = describe_api_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(message, "INVALID_ARGUMENT: API key not valid.");
    }

    #[test]
    fn test_describe_api_error_without_payload() {
        let message = describe_api_error(reqwest::StatusCode::BAD_GATEWAY, "<html>");
        assert!(message.contains("502"));
    }

    #[test]
    fn test_parse_response_skips_thoughts() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"parts":[
                {"text":"thinking...","thought":true},
                {"text":"## Answer\n"},
                {"text":"**I = 2 A**"}
            ]},"finishReason":"STOP"}],
            "usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":5,"thoughtsTokenCount":7}}"###,
        )
        .unwrap();

        let reply = parse_generate_response(parsed);
        assert_eq!(reply.content, Some("## Answer\n**I = 2 A**".to_string()));
        assert_eq!(reply.finish_reason, Some("STOP".to_string()));
        assert_eq!(
            reply.usage,
            Some(TokenUsage {
                prompt_tokens: 10,
                response_tokens: 5,
                thinking_tokens: 7,
            })
        );
    }

    #[test]
    fn test_parse_response_blocked_prompt() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();

        let reply = parse_generate_response(parsed);
        assert!(reply.content.is_none());
        assert_eq!(reply.finish_reason, Some("prompt blocked: SAFETY".to_string()));
    }

    #[tokio::test]
    async fn test_generate_simple() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "QUJD"}},
                        {"text": "Solve"}
                    ]
                }],
                "generationConfig": {"thinkingConfig": {"thinkingBudget": 2048}}
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"R = 10 Ω"}]},"finishReason":"STOP"}]}"#)
            .create_async()
            .await;

        let gateway = gateway(server.url());
        let result = gateway
            .generate("gemini-2.5-flash", &request(), &GenerationConfig::default())
            .await;

        mock.assert_async().await;
        let response = result.unwrap();
        assert_eq!(response.content, Some("R = 10 Ω".to_string()));
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let gateway = gateway(server.url());
        let result = gateway
            .generate("gemini-2.5-flash", &request(), &GenerationConfig::default())
            .await;

        mock.assert_async().await;
        match result {
            Err(PhysiSolveError::GatewayError(msg)) => {
                assert_eq!(msg, "PERMISSION_DENIED: Permission denied")
            }
            other => panic!("Expected GatewayError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_text_is_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"  \n"}]},"finishReason":"MAX_TOKENS"}]}"#)
            .create_async()
            .await;

        let gateway = gateway(server.url());
        let result = gateway
            .generate("gemini-2.5-flash", &request(), &GenerationConfig::default())
            .await;

        mock.assert_async().await;
        match result {
            Err(PhysiSolveError::EmptyResponse(reason)) => assert_eq!(reason, "MAX_TOKENS"),
            other => panic!("Expected EmptyResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_no_candidates_is_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let gateway = gateway(server.url());
        let result = gateway
            .generate("gemini-2.5-flash", &request(), &GenerationConfig::default())
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(PhysiSolveError::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn test_generate_malformed_body_is_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let gateway = gateway(server.url());
        let result = gateway
            .generate("gemini-2.5-flash", &request(), &GenerationConfig::default())
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(PhysiSolveError::HttpError(_))));
    }
}
