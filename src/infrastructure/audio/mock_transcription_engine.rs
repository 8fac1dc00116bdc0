use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    NormalizedAudio, TranscriptionConfig, TranscriptionEngine, TranscriptionError,
};
use crate::domain::TimedTranscript;

/// Test engine returning a fixed transcript, with an optional artificial
/// delay so concurrency behavior can be observed.
pub struct MockTranscriptionEngine {
    transcript: Mutex<TimedTranscript>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    fail_with: Option<TranscriptionError>,
}

impl MockTranscriptionEngine {
    pub fn returning(transcript: TimedTranscript) -> Self {
        Self {
            transcript: Mutex::new(transcript),
            delay: None,
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    pub fn failing(error: TranscriptionError) -> Self {
        Self {
            transcript: Mutex::new(TimedTranscript {
                tokens: Vec::new(),
                duration_sec: 0.0,
                language: "en".to_string(),
            }),
            delay: None,
            calls: AtomicUsize::new(0),
            fail_with: Some(error),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(
        &self,
        _audio: &NormalizedAudio,
        _config: &TranscriptionConfig,
    ) -> Result<TimedTranscript, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        Ok(self.transcript.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
