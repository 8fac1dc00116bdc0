use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::ports::CacheTier;
use crate::domain::Fingerprint;

/// Read-through cache over an ordered list of tiers, with single-flight
/// coalescing: concurrent requests for the same fingerprint share one
/// computation and all receive its result, success or failure.
///
/// Failures are broadcast to the waiters but never stored, so the next
/// request retries from scratch.
pub struct TieredCache<V, E> {
    tiers: Vec<Arc<dyn CacheTier<V>>>,
    inflight: Mutex<HashMap<Fingerprint, broadcast::Sender<Result<V, E>>>>,
    tier_hits: Vec<AtomicU64>,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

/// Point-in-time counter snapshot, keyed by tier name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub tier_hits: Vec<(&'static str, u64)>,
    pub misses: u64,
    pub coalesced: u64,
}

impl<V, E> TieredCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(tiers: Vec<Arc<dyn CacheTier<V>>>) -> Arc<Self> {
        let tier_hits = tiers.iter().map(|_| AtomicU64::new(0)).collect();
        Arc::new(Self {
            tiers,
            inflight: Mutex::new(HashMap::new()),
            tier_hits,
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
        })
    }

    /// Returns the cached value for `key`, or runs `compute` to produce it.
    ///
    /// The computation runs on a detached task: cancelling one caller never
    /// cancels the shared work other callers are waiting on. A hit in a slow
    /// tier is promoted into every faster tier on the way out.
    pub async fn get_or_compute<F, Fut>(
        self: &Arc<Self>,
        key: Fingerprint,
        compute: F,
    ) -> Result<V, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        loop {
            if let Some(value) = self.lookup(&key).await {
                return Ok(value);
            }

            let mut rx = {
                let mut inflight = self.inflight.lock().await;
                if let Some(tx) = inflight.get(&key) {
                    self.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, "joining in-flight computation");
                    tx.subscribe()
                } else {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let (tx, rx) = broadcast::channel(1);
                    inflight.insert(key, tx.clone());
                    drop(inflight);

                    let cache = Arc::clone(self);
                    let fut = compute();
                    tokio::spawn(async move {
                        let outcome = fut.await;
                        if let Ok(value) = &outcome {
                            cache.write_through(&key, value).await;
                        }
                        cache.inflight.lock().await.remove(&key);
                        // All waiters may have been cancelled by now.
                        let _ = tx.send(outcome);
                    });
                    rx
                }
            };

            match rx.recv().await {
                Ok(outcome) => return outcome,
                Err(_) => {
                    // Leader task aborted at runtime shutdown before it could
                    // publish. Start over: either the value made it into a
                    // tier or we become the new leader.
                    warn!(%key, "in-flight computation vanished, restarting lookup");
                }
            }
        }
    }

    async fn lookup(&self, key: &Fingerprint) -> Option<V> {
        for (level, tier) in self.tiers.iter().enumerate() {
            if let Some(value) = tier.get(key).await {
                self.tier_hits[level].fetch_add(1, Ordering::Relaxed);
                debug!(%key, tier = tier.name(), "cache hit");
                for faster in &self.tiers[..level] {
                    faster.set(key, &value).await;
                }
                return Some(value);
            }
        }
        None
    }

    async fn write_through(&self, key: &Fingerprint, value: &V) {
        for tier in &self.tiers {
            tier.set(key, value).await;
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            tier_hits: self
                .tiers
                .iter()
                .zip(&self.tier_hits)
                .map(|(tier, hits)| (tier.name(), hits.load(Ordering::Relaxed)))
                .collect(),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }

    /// Periodically asks every tier to drop expired entries.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                for tier in &cache.tiers {
                    let removed = tier.sweep().await;
                    if removed > 0 {
                        info!(tier = tier.name(), removed, "swept expired cache entries");
                    }
                }
            }
        })
    }
}
