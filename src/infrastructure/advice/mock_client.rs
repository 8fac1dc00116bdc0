use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{AdviceClient, AdviceClientError};
use crate::domain::{Advice, AnalysisResult};

/// Scripted advisory client for tests and offline runs: returns queued
/// outcomes in order, then repeats a canned success.
pub struct MockAdviceClient {
    script: Mutex<VecDeque<Result<Advice, AdviceClientError>>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockAdviceClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes every subsequent call wait before answering, to simulate a
    /// slow or hanging upstream.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    pub fn enqueue(&self, outcome: Result<Advice, AdviceClientError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn canned_advice() -> Advice {
        Advice {
            summary: "A clear, well paced delivery.".to_string(),
            strengths: vec!["Steady speaking rate".to_string()],
            improvements: vec![],
            recommendations: vec!["Keep rehearsing with the same structure".to_string()],
            degraded: false,
        }
    }
}

impl Default for MockAdviceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdviceClient for MockAdviceClient {
    async fn request_advice(&self, _result: &AnalysisResult) -> Result<Advice, AdviceClientError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(Self::canned_advice()))
    }
}
