use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Advice, FillerOccurrence, PauseSpan};

/// Complete outcome of one analysis run.
///
/// Owned exclusively by the caller once returned; the engine keeps no
/// back-reference. All floating-point fields are rounded so that two runs
/// over the same input serialize byte-identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub duration_sec: f64,
    pub speaking_time_sec: f64,
    pub speaking_ratio: f64,
    pub words_total: usize,
    pub words_per_minute: f64,
    pub language: String,
    pub filler_words: FillerStats,
    pub pauses: PauseStats,
    pub phrases: PhraseStats,
    pub advice_notes: Vec<AdviceNote>,
    pub advice: Option<Advice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillerStats {
    /// Occurrences with confidence at or above the counting threshold.
    pub total: usize,
    pub per_100_words: f64,
    /// Counted occurrences grouped by canonical lexeme. BTreeMap keeps the
    /// serialized order stable.
    pub by_lexeme: BTreeMap<String, usize>,
    /// Everything at or above the report threshold, for display.
    pub occurrences: Vec<FillerOccurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseStats {
    pub count: usize,
    pub avg_sec: f64,
    pub max_sec: f64,
    pub spans: Vec<PauseSpan>,
}

/// Pause-delimited phrase structure of the speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseStats {
    pub count: usize,
    pub avg_words: f64,
    pub avg_duration_sec: f64,
    pub length_classification: PhraseLength,
    pub rhythm_variation: RhythmVariation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseLength {
    InsufficientData,
    ShortPhrases,
    Balanced,
    LongPhrases,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhythmVariation {
    InsufficientData,
    Uniform,
    ModeratelyVariable,
    HighlyVariable,
}

/// One deterministic, rule-derived observation about the speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceNote {
    pub category: AdviceCategory,
    pub severity: Severity,
    pub observation: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceCategory {
    SpeechRate,
    FillerWords,
    Pauses,
    Phrasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Suggestion,
    Warning,
}
