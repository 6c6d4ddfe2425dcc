use super::verify::VerificationError;
use crate::alignment::AlignmentError;
use crate::logging::{codes, Code};
use crate::unit::UnitError;

/// Per-unit processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unit loading failed: {0}")]
    Unit(#[from] UnitError),

    #[error("Alignment failed: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::Unit(e) => e.error_code(),
            PipelineError::Alignment(e) => e.error_code(),
            PipelineError::Verification(e) => e.error_code(),
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}
