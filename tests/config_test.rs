use std::time::Duration;

use podium::config::Settings;
use podium::infrastructure::observability::TracingConfig;

#[test]
fn given_empty_document_when_deserialized_then_defaults_apply() {
    let settings: Settings = serde_json::from_str("{}").expect("defaults should deserialize");

    assert_eq!(settings.gate.max_concurrent, 2);
    assert_eq!(settings.cache.memory_capacity, 128);
    assert_eq!(settings.transcription.model, "small");
    assert!(settings.analyzer.validate().is_ok());
}

#[test]
fn given_partial_overrides_when_deserialized_then_rest_keeps_defaults() {
    let raw = r#"{
        "gate": { "max_concurrent": 8 },
        "advisory": { "model": "gpt-4o", "max_attempts": 5 },
        "analyzer": { "min_pause_sec": 0.4 }
    }"#;
    let settings: Settings = serde_json::from_str(raw).expect("partial settings");

    assert_eq!(settings.gate.max_concurrent, 8);
    assert_eq!(settings.gate.admission_timeout_sec, 30);
    assert_eq!(settings.advisory.model, "gpt-4o");
    assert_eq!(settings.advisory.max_attempts, 5);
    assert_eq!(settings.analyzer.min_pause_sec, 0.4);
    assert_eq!(settings.analyzer.pause_long_sec, 2.5);
}

#[test]
fn given_logging_settings_when_converted_then_tracing_config_matches() {
    let raw = r#"{ "logging": { "level": "warn", "enable_json": true } }"#;
    let settings: Settings = serde_json::from_str(raw).expect("logging settings");

    let tracing_config = TracingConfig::from(&settings.logging);

    assert_eq!(tracing_config.level, "warn");
    assert!(tracing_config.json_format);
}

#[test]
fn given_advisory_settings_when_converted_then_policy_durations_match() {
    let settings = Settings::default();
    let policy = settings.advisory.policy();

    assert_eq!(policy.max_attempts, settings.advisory.max_attempts);
    assert_eq!(
        policy.base_backoff,
        Duration::from_millis(settings.advisory.base_backoff_ms)
    );
    assert_eq!(
        policy.breaker_reset_timeout,
        Duration::from_secs(settings.advisory.breaker_reset_timeout_sec)
    );
}
