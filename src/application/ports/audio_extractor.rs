use async_trait::async_trait;

/// Mono PCM audio normalized by the extraction collaborator, ready for the
/// transcription engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl NormalizedAudio {
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract_audio(&self, data: &[u8]) -> Result<NormalizedAudio, ExtractionError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractionError {
    #[error("unsupported media format: {0}")]
    UnsupportedFormat(String),
    #[error("audio extraction failed: {0}")]
    IoFailure(String),
}
