use async_trait::async_trait;

use crate::domain::Fingerprint;

/// One storage level of the cache subsystem. Tiers are ordered fastest
/// first and addressed uniformly by fingerprint.
///
/// Implementations own their eviction policy; a `get` must never return an
/// expired entry. Storage errors are logged by the tier and reported as a
/// miss so a flaky tier can never fail a lookup.
#[async_trait]
pub trait CacheTier<V>: Send + Sync {
    async fn get(&self, key: &Fingerprint) -> Option<V>;
    async fn set(&self, key: &Fingerprint, value: &V);
    /// Drops expired entries. Called out of the request path.
    async fn sweep(&self) -> usize;
    fn name(&self) -> &'static str;
}
