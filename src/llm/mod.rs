pub mod broker;
pub mod gateway;
pub mod gateways;
pub mod models;

pub use broker::{AnalysisBroker, ANALYSIS_FAILED_MESSAGE};
pub use gateway::{GenerationConfig, LlmGateway, DEFAULT_THINKING_BUDGET};
pub use models::{ContentPart, LlmGatewayResponse, MultimodalRequest, TokenUsage};
