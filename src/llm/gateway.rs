use crate::error::Result;
use crate::llm::models::{LlmGatewayResponse, MultimodalRequest};
use async_trait::async_trait;

/// Default reasoning budget, in tokens
pub const DEFAULT_THINKING_BUDGET: u32 = 2048;

/// Configuration for a generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub thinking_budget: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: None,
            max_output_tokens: None,
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
        }
    }
}

impl GenerationConfig {
    /// True when no option would be sent to the provider
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.max_output_tokens.is_none()
            && self.thinking_budget.is_none()
    }
}

/// Abstract interface for multimodal LLM providers
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one request and wait for the complete response
    async fn generate(
        &self,
        model: &str,
        request: &MultimodalRequest,
        config: &GenerationConfig,
    ) -> Result<LlmGatewayResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_default() {
        let config = GenerationConfig::default();

        assert_eq!(config.temperature, None);
        assert_eq!(config.max_output_tokens, None);
        assert_eq!(config.thinking_budget, Some(2048));
        assert!(!config.is_empty());
    }

    #[test]
    fn test_generation_config_empty() {
        let config = GenerationConfig {
            temperature: None,
            max_output_tokens: None,
            thinking_budget: None,
        };
        assert!(config.is_empty());
    }

    #[test]
    fn test_generation_config_clone() {
        let config1 = GenerationConfig {
            temperature: Some(0.2),
            max_output_tokens: Some(4096),
            thinking_budget: None,
        };

        let config2 = config1.clone();
        assert_eq!(config1, config2);
    }
}
