//! Error types for Clipquiz.

use thiserror::Error;

/// Library-level error type for Clipquiz operations.
#[derive(Error, Debug)]
pub enum ClipquizError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Caption fetch failed: {0}")]
    Captions(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },
}

impl ClipquizError {
    /// Whether the error should be reported to the caller as a client error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClipquizError::InvalidUrl(_) | ClipquizError::Acquisition(_))
    }
}

/// Fatal failures of transcript acquisition. Missing captions are not one of
/// these: they only trigger the audio fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionFailure {
    #[error("Error downloading audio: {0}")]
    Download(String),

    #[error("Error converting audio: {0}")]
    Conversion(String),

    #[error("Error with the speech recognition service: {0}")]
    RecognitionService(String),
}

/// Failures local to generating the question for one window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Question rejected by reviewer: {0}")]
    ReviewRejected(String),

    #[error("Failed to generate valid question after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Result type alias for Clipquiz operations.
pub type Result<T> = std::result::Result<T, ClipquizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(ClipquizError::InvalidUrl("x".into()).is_client_error());
        assert!(ClipquizError::from(AcquisitionFailure::Download("boom".into())).is_client_error());
        assert!(!ClipquizError::Config("bad".into()).is_client_error());
    }

    #[test]
    fn test_acquisition_message_is_transparent() {
        let err = ClipquizError::from(AcquisitionFailure::Conversion("ffmpeg exited 1".into()));
        assert_eq!(err.to_string(), "Error converting audio: ffmpeg exited 1");
    }
}
