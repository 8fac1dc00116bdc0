use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, warn};

/// Bounds how many analyses may run concurrently. Transcription is the
/// expensive stage, so the whole compute path runs under one permit.
///
/// Admission is first-come-first-served; a caller that cannot get a permit
/// within the admission timeout is rejected rather than queued forever.
pub struct AnalysisGate {
    semaphore: Semaphore,
    admission_timeout: Duration,
    max_concurrent: usize,
    active: AtomicUsize,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GateError {
    #[error("analysis capacity exhausted, no slot freed within {0:?}")]
    Overloaded(Duration),
}

impl AnalysisGate {
    pub fn new(max_concurrent: usize, admission_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            semaphore: Semaphore::new(max_concurrent.max(1)),
            admission_timeout,
            max_concurrent: max_concurrent.max(1),
            active: AtomicUsize::new(0),
        })
    }

    /// Waits for a free slot. The returned permit releases the slot when
    /// dropped, on success and failure paths alike.
    pub async fn acquire(&self) -> Result<AnalysisPermit<'_>, GateError> {
        let permit = tokio::time::timeout(self.admission_timeout, self.semaphore.acquire())
            .await
            .map_err(|_| {
                warn!(
                    active = self.active.load(Ordering::Relaxed),
                    "admission timed out, rejecting request"
                );
                GateError::Overloaded(self.admission_timeout)
            })?
            // The semaphore is never closed while the gate is alive.
            .map_err(|_| GateError::Overloaded(self.admission_timeout))?;

        let active = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(active, "analysis slot acquired");
        Ok(AnalysisPermit {
            _permit: permit,
            active: &self.active,
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

pub struct AnalysisPermit<'a> {
    _permit: SemaphorePermit<'a>,
    active: &'a AtomicUsize,
}

impl Drop for AnalysisPermit<'_> {
    fn drop(&mut self) {
        let remaining = self.active.fetch_sub(1, Ordering::Relaxed) - 1;
        debug!(active = remaining, "analysis slot released");
    }
}
