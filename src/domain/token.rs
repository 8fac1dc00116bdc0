use serde::{Deserialize, Serialize};

/// A single recognized word with its position on the audio timeline.
///
/// Produced once by the transcription collaborator and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Word,
    /// A hesitation sound flagged by the recognizer itself ("uh", "э-э").
    FillerCandidate,
}

impl TimedToken {
    pub fn word(text: impl Into<String>, start: f64, end: f64, confidence: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            confidence,
            kind: TokenKind::Word,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}
