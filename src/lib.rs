//! PhysiSolve: step-by-step solutions for physics problems photographed from a page.
//!
//! The pipeline is small: an image is encoded ([`image`]), an instruction is composed
//! ([`prompt`]), both go to a multimodal model in one request ([`llm`]), and the answer is
//! split into display blocks ([`render`]). [`shell::AnalysisShell`] ties them together.

pub mod config;
pub mod error;
pub mod image;
pub mod llm;
pub mod prompt;
pub mod render;
pub mod shell;

pub use error::{PhysiSolveError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::error::{PhysiSolveError, Result};
    pub use crate::image::{EncodedImagePart, ImageInput};
    pub use crate::llm::gateways::GeminiGateway;
    pub use crate::llm::{AnalysisBroker, GenerationConfig, LlmGateway};
    pub use crate::render::{render, DisplayBlock, InlineSpan};
    pub use crate::shell::{AnalysisShell, AnalysisStatus};
}
