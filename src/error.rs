//! Error types and result aliases for PhysiSolve.
//!
//! This module defines the core error type [`PhysiSolveError`] and the [`Result`] type alias
//! used throughout the crate. Every failure ends up at the shell boundary, where
//! [`PhysiSolveError::user_message`] turns it into the text shown to the user.

use thiserror::Error;

/// Generic message shown for failures that have no more specific wording.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Error, Debug)]
pub enum PhysiSolveError {
    #[error("Image read error: {0}")]
    ReadError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("{0}")]
    AnalysisError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PhysiSolveError {
    /// Text suitable for the error region of the user interface.
    pub fn user_message(&self) -> String {
        match self {
            Self::ReadError(_) | Self::ConfigError(_) => self.to_string(),
            Self::AnalysisError(msg) => msg.clone(),
            _ => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PhysiSolveError>;
