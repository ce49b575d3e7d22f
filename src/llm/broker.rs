use crate::error::{PhysiSolveError, Result};
use crate::image::{encode_image, EncodedImagePart, ImageInput};
use crate::llm::gateway::{GenerationConfig, LlmGateway};
use crate::llm::models::MultimodalRequest;
use crate::prompt::compose_prompt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Message carried by every failed analysis request.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze the image. Please try again.";

/// Sends one image plus instruction to the configured model and returns its text.
///
/// Exactly one gateway call per submission. There is no retry; any failure surfaces as
/// [`PhysiSolveError::AnalysisError`] after the cause has been logged.
pub struct AnalysisBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    config: GenerationConfig,
}

impl AnalysisBroker {
    /// Create a new broker with the default generation config
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self::with_config(model, gateway, GenerationConfig::default())
    }

    pub fn with_config(
        model: impl Into<String>,
        gateway: Arc<dyn LlmGateway>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            gateway,
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer the user's question about the selected image.
    ///
    /// Read failures are returned as they are and no request is made.
    pub async fn analyze(&self, question: &str, image: &ImageInput) -> Result<String> {
        let span = info_span!(
            "analysis",
            correlation_id = %Uuid::new_v4(),
            model = %self.model,
            media_type = %image.media_type(),
        );

        async move {
            let prompt = compose_prompt(question);
            let encoded = encode_image(image).await?;
            self.submit(&encoded, &prompt).await
        }
        .instrument(span)
        .await
    }

    /// Send the encoded image and prompt as a single multimodal request.
    pub async fn submit(&self, image: &EncodedImagePart, prompt: &str) -> Result<String> {
        let request = MultimodalRequest::new(image.clone(), prompt);
        info!("Submitting analysis request to {}", self.model);
        debug!(
            "Image payload: {} base64 chars, prompt: {} bytes",
            image.data.len(),
            request.text_len()
        );

        let response = match self.gateway.generate(&self.model, &request, &self.config).await {
            Ok(response) => response,
            Err(e) => {
                error!("Analysis request failed: {}", e);
                return Err(PhysiSolveError::AnalysisError(ANALYSIS_FAILED_MESSAGE.to_string()));
            }
        };

        match response.content {
            Some(text) if !text.trim().is_empty() => {
                info!("Analysis completed ({} bytes)", text.len());
                Ok(text)
            }
            _ => {
                error!("Analysis response had no text");
                Err(PhysiSolveError::AnalysisError(ANALYSIS_FAILED_MESSAGE.to_string()))
            }
        }
    }
}
