use crate::error::MediVoiceError;
use thiserror::Error;

/// Terminal failures of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Either audio or a text message must be provided")]
    MissingInput,

    #[error("Failed to transcribe audio")]
    TranscriptionFailed,

    #[error("Internal error: {0}")]
    Internal(#[from] MediVoiceError),
}

impl PipelineError {
    /// True when the caller sent something unusable; no side effects happened.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingInput | PipelineError::TranscriptionFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(PipelineError::MissingInput.is_client_error());
        assert!(PipelineError::TranscriptionFailed.is_client_error());
        assert!(!PipelineError::Internal(MediVoiceError::Validation("x".into())).is_client_error());
    }
}
