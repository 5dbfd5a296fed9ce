//! Pipeline error types

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("pipeline step #{index} failed: {message}")]
    StepFailure { index: usize, message: String },
}

impl PipelineError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::StepFailure { .. } => "JSONDB_PIPELINE_STEP_FAILURE",
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
