mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{analyze, steady_150_words};
use podium::application::ports::AdviceClientError;
use podium::application::services::{AdvisoryPolicy, AdvisoryService, BreakerState};
use podium::infrastructure::advice::MockAdviceClient;

fn fast_policy() -> AdvisoryPolicy {
    AdvisoryPolicy {
        max_attempts: 3,
        base_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_secs(1),
        jitter: 0.0,
        request_timeout: Duration::from_secs(5),
        overall_timeout: Duration::from_secs(30),
        breaker_fail_max: 5,
        breaker_reset_timeout: Duration::from_secs(60),
    }
}

#[tokio::test(start_paused = true)]
async fn given_transient_failure_when_retried_then_second_attempt_succeeds() {
    let client = Arc::new(MockAdviceClient::new());
    client.enqueue(Err(AdviceClientError::Timeout));
    let service = AdvisoryService::new(client.clone(), fast_policy());
    let result = analyze(&steady_150_words());

    let advice = service.get_advice(&result).await;

    assert!(!advice.degraded);
    assert_eq!(client.call_count(), 2);
    assert_eq!(service.stats().retried_success, 1);
}

#[tokio::test(start_paused = true)]
async fn given_non_transient_failure_when_called_then_falls_back_without_retry() {
    let client = Arc::new(MockAdviceClient::new());
    client.enqueue(Err(AdviceClientError::Unauthorized));
    let service = AdvisoryService::new(client.clone(), fast_policy());
    let result = analyze(&steady_150_words());

    let advice = service.get_advice(&result).await;

    assert!(advice.degraded);
    assert_eq!(client.call_count(), 1);
    assert_eq!(service.stats().fallback, 1);
}

#[tokio::test(start_paused = true)]
async fn given_exhausted_retries_when_all_fail_then_degraded_advice_returned() {
    let client = Arc::new(MockAdviceClient::new());
    for _ in 0..3 {
        client.enqueue(Err(AdviceClientError::RateLimited));
    }
    let service = AdvisoryService::new(client.clone(), fast_policy());
    let result = analyze(&steady_150_words());

    let advice = service.get_advice(&result).await;

    assert!(advice.degraded);
    assert!(!advice.summary.is_empty());
    assert_eq!(client.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn given_repeated_failures_when_threshold_reached_then_breaker_opens_and_skips_network() {
    let policy = AdvisoryPolicy {
        max_attempts: 1,
        breaker_fail_max: 2,
        ..fast_policy()
    };
    let client = Arc::new(MockAdviceClient::new());
    client.enqueue(Err(AdviceClientError::Timeout));
    client.enqueue(Err(AdviceClientError::Timeout));
    let service = AdvisoryService::new(client.clone(), policy);
    let result = analyze(&steady_150_words());

    let first = service.get_advice(&result).await;
    let second = service.get_advice(&result).await;
    assert!(first.degraded);
    assert!(second.degraded);
    assert_eq!(service.breaker_state(), BreakerState::Open);

    // The circuit is open: no further calls reach the client.
    let third = service.get_advice(&result).await;
    assert!(third.degraded);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn given_open_breaker_when_reset_timeout_elapses_then_single_probe_recloses_it() {
    let policy = AdvisoryPolicy {
        max_attempts: 1,
        breaker_fail_max: 1,
        breaker_reset_timeout: Duration::from_secs(10),
        ..fast_policy()
    };
    let client = Arc::new(MockAdviceClient::new());
    client.enqueue(Err(AdviceClientError::Timeout));
    let service = AdvisoryService::new(client.clone(), policy);
    let result = analyze(&steady_150_words());

    let _ = service.get_advice(&result).await;
    assert_eq!(service.breaker_state(), BreakerState::Open);

    tokio::time::advance(Duration::from_secs(11)).await;

    let probe = service.get_advice(&result).await;
    assert!(!probe.degraded);
    assert_eq!(service.breaker_state(), BreakerState::Closed);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn given_half_open_call_cancelled_mid_flight_when_cooldown_elapses_then_breaker_recovers() {
    let policy = AdvisoryPolicy {
        max_attempts: 1,
        breaker_fail_max: 1,
        breaker_reset_timeout: Duration::from_secs(10),
        request_timeout: Duration::from_secs(60),
        overall_timeout: Duration::from_secs(5),
        ..fast_policy()
    };
    let client = Arc::new(MockAdviceClient::new());
    client.enqueue(Err(AdviceClientError::Timeout));
    let service = AdvisoryService::new(client.clone(), policy);
    let result = analyze(&steady_150_words());

    let _ = service.get_advice(&result).await;
    assert_eq!(service.breaker_state(), BreakerState::Open);

    // The half-open call hangs past the overall budget and is cancelled
    // before it can report an outcome.
    tokio::time::advance(Duration::from_secs(11)).await;
    client.set_delay(Some(Duration::from_secs(30)));
    let stalled = service.get_advice(&result).await;
    assert!(stalled.degraded);
    assert_eq!(client.call_count(), 2);
    assert_eq!(service.breaker_state(), BreakerState::Open);

    // The circuit re-opened rather than sticking half-open, so after
    // another cooldown a healthy upstream closes it again.
    client.set_delay(None);
    tokio::time::advance(Duration::from_secs(11)).await;
    let recovered = service.get_advice(&result).await;
    assert!(!recovered.degraded);
    assert_eq!(service.breaker_state(), BreakerState::Closed);
    assert_eq!(client.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn given_fallback_advice_when_metrics_have_warnings_then_improvements_filled_from_notes() {
    let client = Arc::new(MockAdviceClient::new());
    client.enqueue(Err(AdviceClientError::Unauthorized));
    let service = AdvisoryService::new(client, fast_policy());

    // A single slow word over a long recording trips the rate rule.
    let result = analyze(&common::transcript(
        vec![common::word("hello", 0.0, 2.0)],
        30.0,
    ));

    let advice = service.get_advice(&result).await;

    assert!(advice.degraded);
    assert!(!advice.strengths.is_empty() || !advice.improvements.is_empty());
    assert_eq!(advice.recommendations.len(), advice.improvements.len());
}
