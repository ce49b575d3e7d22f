use crate::image::EncodedImagePart;
use serde::{Deserialize, Serialize};

/// One piece of a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Image(EncodedImagePart),
    Text(String),
}

/// A single-turn request: the image first, then the instruction.
#[derive(Debug, Clone)]
pub struct MultimodalRequest {
    pub parts: Vec<ContentPart>,
}

impl MultimodalRequest {
    /// Bundle an image and its instruction into one request
    pub fn new(image: EncodedImagePart, prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Image(image), ContentPart::Text(prompt.into())],
        }
    }

    /// Total length of the text parts, in bytes
    pub fn text_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(t) => t.len(),
                ContentPart::Image(_) => 0,
            })
            .sum()
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub thinking_tokens: u32,
}

/// Response from LLM gateway
#[derive(Debug, Clone, Default)]
pub struct LlmGatewayResponse {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl LlmGatewayResponse {
    /// Text response with no metadata
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}
