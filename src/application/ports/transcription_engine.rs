use async_trait::async_trait;

use super::NormalizedAudio;
use crate::domain::TimedTranscript;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionConfig {
    pub model: String,
    pub language: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "small".to_string(),
            language: "auto".to_string(),
        }
    }
}

/// Speech-to-text collaborator producing a word-level timed transcript.
///
/// May run for seconds to minutes; callers must hold a gate permit while
/// invoking it.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        audio: &NormalizedAudio,
        config: &TranscriptionConfig,
    ) -> Result<TimedTranscript, TranscriptionError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
}
