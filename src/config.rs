use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::application::services::{AdvisoryPolicy, AnalyzerConfig};

/// Top-level settings tree, deserialized from whatever source the hosting
/// process provides (file, environment layer, test fixture).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analyzer: AnalyzerConfig,
    pub transcription: TranscriptionSettings,
    pub cache: CacheSettings,
    pub gate: GateSettings,
    pub advisory: AdvisorySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub memory_capacity: usize,
    pub memory_ttl_sec: u64,
    pub disk_dir: PathBuf,
    pub disk_ttl_sec: u64,
    pub sweep_interval_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    pub max_concurrent: usize,
    pub admission_timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorySettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub request_timeout_sec: u64,
    pub overall_timeout_sec: u64,
    pub breaker_fail_max: u32,
    pub breaker_reset_timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            transcription: TranscriptionSettings::default(),
            cache: CacheSettings::default(),
            gate: GateSettings::default(),
            advisory: AdvisorySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "small".to_string(),
            language: "auto".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            memory_capacity: 128,
            memory_ttl_sec: 3600,
            disk_dir: PathBuf::from("./cache/analysis"),
            disk_ttl_sec: 24 * 3600,
            sweep_interval_sec: 600,
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            admission_timeout_sec: 30,
        }
    }
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            max_attempts: 3,
            base_backoff_ms: 500,
            max_backoff_ms: 8000,
            request_timeout_sec: 15,
            overall_timeout_sec: 45,
            breaker_fail_max: 5,
            breaker_reset_timeout_sec: 60,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}

impl AdvisorySettings {
    pub fn policy(&self) -> AdvisoryPolicy {
        AdvisoryPolicy {
            max_attempts: self.max_attempts,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            jitter: 0.1,
            request_timeout: Duration::from_secs(self.request_timeout_sec),
            overall_timeout: Duration::from_secs(self.overall_timeout_sec),
            breaker_fail_max: self.breaker_fail_max,
            breaker_reset_timeout: Duration::from_secs(self.breaker_reset_timeout_sec),
        }
    }
}
