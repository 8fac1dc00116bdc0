use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use super::breaker::{BreakerState, CircuitBreaker};
use crate::application::ports::{AdviceClient, AdviceClientError};
use crate::domain::{Advice, AnalysisResult, Severity};

/// Retry and timeout policy for the advisory upstream.
#[derive(Debug, Clone)]
pub struct AdvisoryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Relative jitter applied to each backoff, 0.1 = +/-10%.
    pub jitter: f64,
    pub request_timeout: Duration,
    /// Budget for the whole attempt sequence, backoffs included.
    pub overall_timeout: Duration,
    pub breaker_fail_max: u32,
    pub breaker_reset_timeout: Duration,
}

impl Default for AdvisoryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            jitter: 0.1,
            request_timeout: Duration::from_secs(15),
            overall_timeout: Duration::from_secs(45),
            breaker_fail_max: 5,
            breaker_reset_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvisoryStats {
    pub success: u64,
    pub retried_success: u64,
    pub fallback: u64,
    pub hard_failure: u64,
}

/// Wraps a raw [`AdviceClient`] with retries, a circuit breaker and a local
/// fallback. The advisory stage is strictly best-effort: this wrapper never
/// fails, it degrades.
pub struct AdvisoryService {
    client: Arc<dyn AdviceClient>,
    policy: AdvisoryPolicy,
    breaker: CircuitBreaker,
    success: AtomicU64,
    retried_success: AtomicU64,
    fallback: AtomicU64,
    hard_failure: AtomicU64,
}

impl AdvisoryService {
    pub fn new(client: Arc<dyn AdviceClient>, policy: AdvisoryPolicy) -> Self {
        let breaker = CircuitBreaker::new(policy.breaker_fail_max, policy.breaker_reset_timeout);
        Self {
            client,
            policy,
            breaker,
            success: AtomicU64::new(0),
            retried_success: AtomicU64::new(0),
            fallback: AtomicU64::new(0),
            hard_failure: AtomicU64::new(0),
        }
    }

    /// Fetches advice for a finished analysis, falling back to advice
    /// synthesized from the rule-based notes when the upstream is down.
    pub async fn get_advice(&self, result: &AnalysisResult) -> Advice {
        match tokio::time::timeout(self.policy.overall_timeout, self.attempt_loop(result)).await {
            Ok(Some(advice)) => advice,
            Ok(None) => self.degrade(result),
            Err(_) => {
                warn!("advisory attempts exceeded the overall budget");
                self.degrade(result)
            }
        }
    }

    async fn attempt_loop(&self, result: &AnalysisResult) -> Option<Advice> {
        for attempt in 0..self.policy.max_attempts {
            let permit = match self.breaker.try_acquire() {
                Ok(permit) => permit,
                Err(_) => {
                    debug!("advisory call rejected by open circuit breaker");
                    return None;
                }
            };

            let call = self.client.request_advice(result);
            let outcome = match tokio::time::timeout(self.policy.request_timeout, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AdviceClientError::Timeout),
            };

            match outcome {
                Ok(advice) => {
                    permit.record_success();
                    self.success.fetch_add(1, Ordering::Relaxed);
                    if attempt > 0 {
                        self.retried_success.fetch_add(1, Ordering::Relaxed);
                        info!(attempt, "advisory call succeeded after retry");
                    }
                    return Some(advice);
                }
                Err(err) => {
                    permit.record_failure();
                    if !err.is_transient() {
                        self.hard_failure.fetch_add(1, Ordering::Relaxed);
                        warn!(error = %err, "advisory call failed permanently");
                        return None;
                    }
                    warn!(error = %err, attempt, "advisory call failed, will retry");
                    if attempt + 1 < self.policy.max_attempts {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
            }
        }
        None
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.policy.base_backoff.as_secs_f64() * 2f64.powi(attempt as i32);
        let capped = base.min(self.policy.max_backoff.as_secs_f64());
        let jitter = rand::thread_rng().gen_range(-self.policy.jitter..=self.policy.jitter);
        Duration::from_secs_f64((capped * (1.0 + jitter)).max(0.0))
    }

    fn degrade(&self, result: &AnalysisResult) -> Advice {
        self.fallback.fetch_add(1, Ordering::Relaxed);
        synthesize_advice(result)
    }

    pub fn stats(&self) -> AdvisoryStats {
        AdvisoryStats {
            success: self.success.load(Ordering::Relaxed),
            retried_success: self.retried_success.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            hard_failure: self.hard_failure.load(Ordering::Relaxed),
        }
    }

    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }
}

/// Builds degraded advice from the deterministic rule notes so the caller
/// always gets a usable, clearly marked response.
fn synthesize_advice(result: &AnalysisResult) -> Advice {
    let strengths: Vec<String> = result
        .advice_notes
        .iter()
        .filter(|n| n.severity == Severity::Info)
        .map(|n| n.observation.clone())
        .collect();
    let improvements: Vec<String> = result
        .advice_notes
        .iter()
        .filter(|n| n.severity > Severity::Info)
        .map(|n| n.observation.clone())
        .collect();
    let recommendations: Vec<String> = result
        .advice_notes
        .iter()
        .filter(|n| n.severity > Severity::Info)
        .map(|n| n.recommendation.clone())
        .collect();

    let summary = if improvements.is_empty() {
        format!(
            "The delivery sounds confident: about {:.0} words per minute with controlled \
             pauses and few fillers.",
            result.words_per_minute
        )
    } else {
        format!(
            "The analysis found {} area(s) worth attention; see the recommendations below.",
            improvements.len()
        )
    };

    Advice {
        summary,
        strengths,
        improvements,
        recommendations,
        degraded: true,
    }
}
