use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use crate::application::ports::CacheTier;
use crate::domain::Fingerprint;

/// Fastest tier: an in-process map with per-entry TTL and a capacity bound.
/// When full, the least recently used entry is evicted.
pub struct MemoryTier<V> {
    entries: Mutex<HashMap<Fingerprint, Entry<V>>>,
    ttl: Duration,
    capacity: usize,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
    last_used: Instant,
}

impl<V> MemoryTier<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl<V> CacheTier<V> for MemoryTier<V>
where
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &Fingerprint) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        match entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.last_used = now;
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &Fingerprint, value: &V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| *k)
            {
                debug!(key = %oldest, "evicting least recently used entry");
                entries.remove(&oldest);
            }
        }
        entries.insert(
            *key,
            Entry {
                value: value.clone(),
                expires_at: now + self.ttl,
                last_used: now,
            },
        );
    }

    async fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
