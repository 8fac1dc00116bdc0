use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ports::CacheTier;
use crate::domain::Fingerprint;

/// Durable tier: one JSON file per fingerprint, surviving restarts.
///
/// Expiry is stored inside the entry as wall-clock timestamps so a restart
/// cannot resurrect stale results. All I/O failures degrade to a miss.
pub struct DiskTier<V> {
    dir: PathBuf,
    ttl: Duration,
    _value: PhantomData<fn() -> V>,
}

#[derive(Serialize, Deserialize)]
struct DiskEntry<V> {
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    value: V,
}

impl<V> DiskTier<V> {
    pub async fn new(dir: impl Into<PathBuf>, ttl: Duration) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            ttl,
            _value: PhantomData,
        })
    }

    fn entry_path(&self, key: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.json", key.to_hex()))
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "failed to remove cache file");
        }
    }
}

#[async_trait]
impl<V> CacheTier<V> for DiskTier<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    async fn get(&self, key: &Fingerprint) -> Option<V> {
        let path = self.entry_path(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(%key, error = %err, "disk cache read failed");
                return None;
            }
        };

        let entry: DiskEntry<V> = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%key, error = %err, "corrupt disk cache entry, dropping");
                remove_quietly(&path).await;
                return None;
            }
        };

        if entry.expires_at <= Utc::now() {
            debug!(%key, "disk cache entry expired");
            remove_quietly(&path).await;
            return None;
        }
        Some(entry.value)
    }

    async fn set(&self, key: &Fingerprint, value: &V) {
        let now = Utc::now();
        let entry = DiskEntry {
            created_at: now,
            expires_at: now
                + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX),
            value: value.clone(),
        };
        let raw = match serde_json::to_vec(&entry) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%key, error = %err, "disk cache serialization failed");
                return;
            }
        };

        // Write-then-rename keeps readers from ever seeing a partial file.
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        if let Err(err) = tokio::fs::write(&tmp, &raw).await {
            warn!(%key, error = %err, "disk cache write failed");
            return;
        }
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            warn!(%key, error = %err, "disk cache rename failed");
            remove_quietly(&tmp).await;
        }
    }

    async fn sweep(&self) -> usize {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(err) => {
                warn!(error = %err, "disk cache sweep could not list directory");
                return 0;
            }
        };

        let now = Utc::now();
        let mut removed = 0usize;
        loop {
            let item = match dir.next_entry().await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "disk cache sweep interrupted");
                    break;
                }
            };
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let expired = match tokio::fs::read(&path).await {
                Ok(raw) => match serde_json::from_slice::<DiskEntry<serde_json::Value>>(&raw) {
                    Ok(entry) => entry.expires_at <= now,
                    // Unparseable entries are garbage either way.
                    Err(_) => true,
                },
                Err(_) => false,
            };
            if expired {
                remove_quietly(&path).await;
                removed += 1;
            }
        }
        removed
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
