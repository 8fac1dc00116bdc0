use serde::{Deserialize, Serialize};

/// A scored filler-word hit on the token timeline.
///
/// Kept for display whenever its confidence clears the report threshold,
/// even when it falls short of the counting threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillerOccurrence {
    pub token_index: usize,
    /// Canonical lexicon form ("как бы", "um").
    pub lexeme: String,
    /// The token text as recognized.
    pub exact_text: String,
    pub start_sec: f64,
    pub context_before: String,
    pub context_after: String,
    pub confidence: f64,
}
