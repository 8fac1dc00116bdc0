mod advice;
mod analysis;
mod filler;
mod fingerprint;
mod pause;
mod token;
mod transcript;

pub use advice::Advice;
pub use analysis::{
    AdviceCategory, AdviceNote, AnalysisResult, FillerStats, PauseStats, PhraseLength,
    PhraseStats, RhythmVariation, Severity,
};
pub use filler::FillerOccurrence;
pub use fingerprint::{Fingerprint, FingerprintParams};
pub use pause::{PauseClass, PauseSpan};
pub use token::{TimedToken, TokenKind};
pub use transcript::{TimedTranscript, ValidationError};
