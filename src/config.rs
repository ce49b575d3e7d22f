//! Startup configuration.
//!
//! Read once from the process environment (optionally primed from a `.env` file by the
//! binary). A missing credential is reported here, before any client exists.

use crate::error::{PhysiSolveError, Result};
use crate::llm::gateway::{GenerationConfig, DEFAULT_THINKING_BUDGET};
use crate::llm::gateways::gemini::{GeminiConfig, DEFAULT_BASE_URL};
use std::time::Duration;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const API_KEY_FALLBACK_VAR: &str = "VITE_GEMINI_API_KEY";
pub const MODEL_VAR: &str = "PHYSISOLVE_MODEL";
pub const ENDPOINT_VAR: &str = "GEMINI_API_ENDPOINT";
pub const THINKING_BUDGET_VAR: &str = "PHYSISOLVE_THINKING_BUDGET";
pub const TIMEOUT_VAR: &str = "PHYSISOLVE_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub thinking_budget: Option<u32>,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("thinking_budget", &self.thinking_budget)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR)
            .or_else(|| non_blank(API_KEY_FALLBACK_VAR))
            .ok_or_else(|| {
                PhysiSolveError::ConfigError(format!(
                    "no API key found; set {} (or {})",
                    API_KEY_VAR, API_KEY_FALLBACK_VAR
                ))
            })?;

        let model = non_blank(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_blank(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let thinking_budget = match non_blank(THINKING_BUDGET_VAR) {
            Some(raw) => match parse_number(THINKING_BUDGET_VAR, &raw)? {
                0 => None,
                budget => Some(budget as u32),
            },
            None => Some(DEFAULT_THINKING_BUDGET),
        };

        let timeout = match non_blank(TIMEOUT_VAR) {
            Some(raw) => match parse_number(TIMEOUT_VAR, &raw)? {
                0 => {
                    return Err(PhysiSolveError::ConfigError(format!(
                        "{} must be at least 1 second",
                        TIMEOUT_VAR
                    )))
                }
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            model,
            base_url,
            thinking_budget,
            timeout,
        })
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            thinking_budget: self.thinking_budget,
            ..Default::default()
        }
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u64> {
    let value: u64 = raw.trim().parse().map_err(|_| {
        PhysiSolveError::ConfigError(format!("{} must be a non-negative integer, got {:?}", name, raw))
    })?;
    if value > u64::from(u32::MAX) {
        return Err(PhysiSolveError::ConfigError(format!("{} is too large: {}", name, raw)));
    }
    Ok(value)
}
