//! Application state for one user session.
//!
//! [`AnalysisShell`] owns the selected image, the question text, and the outcome of the
//! last analysis. Every user action goes through one of its methods; the surfaces on top
//! only display what it holds.

use crate::error::PhysiSolveError;
use crate::image::ImageInput;
use crate::llm::broker::AnalysisBroker;
use crate::render::{render, DisplayBlock};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Stage of the submit lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Analyzing,
    Success,
    Error,
}

impl AnalysisStatus {
    /// Short status line for the user interface
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStatus::Idle => "Ready. The solution will appear here.",
            AnalysisStatus::Analyzing => {
                "Analyzing the diagram and computing... this can take a few seconds."
            }
            AnalysisStatus::Success => "Solution ready.",
            AnalysisStatus::Error => "Analysis failed.",
        }
    }
}

/// A successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

pub struct AnalysisShell {
    broker: Arc<AnalysisBroker>,
    image: Option<ImageInput>,
    question: String,
    status: AnalysisStatus,
    result: Option<AnalysisResult>,
    error_message: Option<String>,
}

impl AnalysisShell {
    pub fn new(broker: Arc<AnalysisBroker>) -> Self {
        Self {
            broker,
            image: None,
            question: String::new(),
            status: AnalysisStatus::Idle,
            result: None,
            error_message: None,
        }
    }

    /// Select (or drop in) a new image, replacing any previous one.
    pub fn select_image(&mut self, image: ImageInput) {
        info!("Image selected: {}", image.preview());
        self.image = Some(image);
        self.status = AnalysisStatus::Idle;
        self.result = None;
        self.error_message = None;
    }

    /// Forget the image, the question and any outcome.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.question.clear();
        self.status = AnalysisStatus::Idle;
        self.result = None;
        self.error_message = None;
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Whether [`submit`](Self::submit) would start an analysis.
    pub fn can_submit(&self) -> bool {
        self.image.is_some() && self.status != AnalysisStatus::Analyzing
    }

    /// Run one analysis of the selected image.
    ///
    /// Does nothing when no image is selected. Otherwise ends in `Success` or `Error`;
    /// failures never escape as errors or panics.
    pub async fn submit(&mut self) -> AnalysisStatus {
        let Some(image) = self.image.clone() else {
            warn!("Submit ignored: no image selected");
            return self.status;
        };

        self.status = AnalysisStatus::Analyzing;
        self.error_message = None;

        let broker = Arc::clone(&self.broker);
        let question = self.question.clone();
        let task = tokio::spawn(async move { broker.analyze(&question, &image).await });

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!("Analysis task failed: {}", join_error);
                Err(PhysiSolveError::Unexpected(join_error.to_string()))
            }
        };

        match outcome {
            Ok(text) => {
                self.result = Some(AnalysisResult {
                    text,
                    timestamp: Utc::now(),
                });
                self.status = AnalysisStatus::Success;
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                self.result = None;
                self.error_message = Some(e.user_message());
                self.status = AnalysisStatus::Error;
            }
        }

        self.status
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn image(&self) -> Option<&ImageInput> {
        self.image.as_ref()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self.status {
            AnalysisStatus::Error => self.error_message.as_deref(),
            _ => None,
        }
    }

    /// The last result, formatted for display.
    pub fn blocks(&self) -> Option<Vec<DisplayBlock>> {
        self.result.as_ref().map(|r| render(&r.text))
    }
}
