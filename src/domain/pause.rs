use serde::{Deserialize, Serialize};

/// A silent gap between two consecutive tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseSpan {
    pub start: f64,
    pub end: f64,
    pub duration_sec: f64,
    pub classification: PauseClass,
}

/// Severity ordering: `Micro < Normal < Long < Thinking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseClass {
    Micro,
    Normal,
    Long,
    Thinking,
}
