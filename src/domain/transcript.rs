use serde::{Deserialize, Serialize};

use super::TimedToken;

/// Immutable output of the transcription collaborator: an ordered,
/// non-overlapping token timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedTranscript {
    pub tokens: Vec<TimedToken>,
    pub duration_sec: f64,
    pub language: String,
}

impl TimedTranscript {
    pub fn new(tokens: Vec<TimedToken>, duration_sec: f64, language: impl Into<String>) -> Self {
        Self {
            tokens,
            duration_sec,
            language: language.into(),
        }
    }

    /// Checks the structural invariants a well-formed transcript must hold.
    ///
    /// A violation is a programming-contract breach by the transcription
    /// collaborator; it is surfaced, never silently repaired.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut prev_end: Option<f64> = None;
        for (index, token) in self.tokens.iter().enumerate() {
            if token.end < token.start {
                return Err(ValidationError::NegativeDuration { index });
            }
            if !(0.0..=1.0).contains(&token.confidence) {
                return Err(ValidationError::ConfidenceOutOfRange { index });
            }
            if let Some(prev) = prev_end {
                if token.start < prev {
                    return Err(ValidationError::OverlappingTokens { index });
                }
            }
            prev_end = Some(token.end);
        }
        if let Some(last) = self.tokens.last() {
            if self.duration_sec < last.end {
                return Err(ValidationError::DurationTooShort {
                    duration_sec: self.duration_sec,
                    last_token_end: last.end,
                });
            }
        }
        if self.duration_sec < 0.0 {
            return Err(ValidationError::DurationTooShort {
                duration_sec: self.duration_sec,
                last_token_end: 0.0,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("token {index} ends before it starts")]
    NegativeDuration { index: usize },
    #[error("token {index} overlaps the preceding token")]
    OverlappingTokens { index: usize },
    #[error("token {index} confidence outside [0, 1]")]
    ConfidenceOutOfRange { index: usize },
    #[error("transcript duration {duration_sec}s is shorter than the last token end {last_token_end}s")]
    DurationTooShort {
        duration_sec: f64,
        last_token_end: f64,
    },
}
