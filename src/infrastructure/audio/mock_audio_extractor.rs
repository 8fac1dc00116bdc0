use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::ports::{AudioExtractor, ExtractionError, NormalizedAudio};

/// Deterministic extractor for tests and offline runs: interprets the input
/// length as audio duration (one byte per millisecond of silence).
pub struct MockAudioExtractor {
    sample_rate: u32,
    calls: AtomicUsize,
    fail_with: Option<ExtractionError>,
}

impl MockAudioExtractor {
    pub fn new() -> Self {
        Self {
            sample_rate: 16_000,
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    pub fn failing(error: ExtractionError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for MockAudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioExtractor for MockAudioExtractor {
    async fn extract_audio(&self, data: &[u8]) -> Result<NormalizedAudio, ExtractionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let samples_per_ms = self.sample_rate as usize / 1000;
        Ok(NormalizedAudio {
            samples: vec![0.0; data.len() * samples_per_ms],
            sample_rate: self.sample_rate,
        })
    }
}
