#![allow(dead_code)]

use podium::application::services::{AnalyzerConfig, SpeechAnalyzer};
use podium::domain::{AnalysisResult, TimedToken, TimedTranscript, TokenKind};

pub fn word(text: &str, start: f64, end: f64) -> TimedToken {
    TimedToken {
        text: text.to_string(),
        start,
        end,
        confidence: 1.0,
        kind: TokenKind::Word,
    }
}

pub fn hesitation(text: &str, start: f64, end: f64) -> TimedToken {
    TimedToken {
        text: text.to_string(),
        start,
        end,
        confidence: 1.0,
        kind: TokenKind::FillerCandidate,
    }
}

pub fn transcript(tokens: Vec<TimedToken>, duration_sec: f64) -> TimedTranscript {
    TimedTranscript::new(tokens, duration_sec, "en")
}

/// 150 plain words spoken for 50s inside a 60s recording, with gaps too
/// short to register as pauses.
pub fn steady_150_words() -> TimedTranscript {
    let tokens = (0..150)
        .map(|i| {
            let start = i as f64 * 0.4;
            word(&format!("word{i}"), start, start + 1.0 / 3.0)
        })
        .collect();
    transcript(tokens, 60.0)
}

pub fn analyze(transcript: &TimedTranscript) -> AnalysisResult {
    SpeechAnalyzer
        .analyze(transcript, &AnalyzerConfig::default())
        .expect("transcript should be valid")
}
