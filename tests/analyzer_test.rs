mod common;

use common::{analyze, hesitation, steady_150_words, transcript, word};
use podium::application::services::{AnalyzerConfig, SpeechAnalyzer};
use podium::domain::{AdviceCategory, PauseClass, Severity, ValidationError};

#[test]
fn given_identical_transcripts_when_analyzed_twice_then_results_serialize_identically() {
    let transcript = steady_150_words();
    let first = analyze(&transcript);
    let second = analyze(&transcript);

    let first_json = serde_json::to_string(&first).expect("result should serialize");
    let second_json = serde_json::to_string(&second).expect("result should serialize");
    assert_eq!(first_json, second_json);
}

#[test]
fn given_150_words_in_50s_of_speech_when_analyzed_then_rate_is_180_wpm() {
    let result = analyze(&steady_150_words());

    assert_eq!(result.words_total, 150);
    assert_eq!(result.words_per_minute, 180.0);
    assert_eq!(result.speaking_ratio, 0.833);
}

#[test]
fn given_speaking_time_below_guard_when_analyzed_then_rate_is_zero() {
    let result = analyze(&transcript(vec![word("hi", 0.0, 0.2)], 5.0));

    assert_eq!(result.words_total, 1);
    assert_eq!(result.words_per_minute, 0.0);
}

#[test]
fn given_zero_duration_transcript_when_analyzed_then_ratio_and_rate_are_zero() {
    let result = analyze(&transcript(vec![], 0.0));

    assert_eq!(result.duration_sec, 0.0);
    assert_eq!(result.speaking_ratio, 0.0);
    assert_eq!(result.words_per_minute, 0.0);
}

#[test]
fn given_empty_transcript_when_analyzed_then_all_stats_are_zero() {
    let result = analyze(&transcript(vec![], 10.0));

    assert_eq!(result.words_total, 0);
    assert_eq!(result.words_per_minute, 0.0);
    assert_eq!(result.pauses.count, 0);
    assert_eq!(result.filler_words.total, 0);
    assert_eq!(result.phrases.count, 0);
}

#[test]
fn given_gap_exactly_at_long_threshold_when_analyzed_then_classified_long() {
    let config = AnalyzerConfig::default();
    let tokens = vec![
        word("before", 0.0, 1.0),
        word("after", 1.0 + config.pause_long_sec, 2.0 + config.pause_long_sec),
    ];
    let result = analyze(&transcript(tokens, 10.0));

    assert_eq!(result.pauses.count, 1);
    assert_eq!(result.pauses.spans[0].classification, PauseClass::Long);
}

#[test]
fn given_gaps_of_half_one_two_and_four_six_seconds_when_analyzed_then_classes_ascend() {
    let config = AnalyzerConfig {
        pause_long_sec: 4.0,
        pause_thinking_sec: 10.0,
        ..AnalyzerConfig::default()
    };
    let tokens = vec![
        word("a", 0.0, 1.0),
        word("b", 1.5, 2.5),   // gap 0.5
        word("c", 3.7, 4.7),   // gap 1.2
        word("d", 9.3, 10.3),  // gap 4.6
    ];
    let result = SpeechAnalyzer
        .analyze(&transcript(tokens, 11.0), &config)
        .expect("transcript should be valid");

    let classes: Vec<PauseClass> = result
        .pauses
        .spans
        .iter()
        .map(|p| p.classification)
        .collect();
    assert_eq!(
        classes,
        vec![PauseClass::Micro, PauseClass::Normal, PauseClass::Long]
    );
}

#[test]
fn given_gap_below_min_pause_when_analyzed_then_no_pause_recorded() {
    let tokens = vec![word("a", 0.0, 1.0), word("b", 1.4, 2.4)];
    let result = analyze(&transcript(tokens, 3.0));

    assert_eq!(result.pauses.count, 0);
}

#[test]
fn given_hesitation_token_when_analyzed_then_counted_and_excluded_from_word_count() {
    let tokens = vec![
        word("the", 0.0, 0.3),
        hesitation("эээ", 0.4, 0.9),
        word("weather", 1.0, 1.5),
    ];
    let result = analyze(&transcript(tokens, 2.0));

    assert_eq!(result.filler_words.total, 1);
    assert_eq!(result.filler_words.by_lexeme.get("ээ"), Some(&1));
    assert_eq!(result.words_total, 2);
}

#[test]
fn given_contextual_filler_between_thresholds_when_analyzed_then_reported_but_not_counted() {
    // "вот" starts at the contextual base confidence of 0.5: above the
    // report bar, below the counting bar, with no boost applicable.
    let tokens = vec![
        word("вот", 0.0, 0.3),
        word("дом", 0.35, 0.8),
        word("стоит", 0.85, 1.3),
    ];
    let result = analyze(&transcript(tokens, 2.0));

    assert_eq!(result.filler_words.total, 0);
    assert!(result.filler_words.by_lexeme.is_empty());
    assert_eq!(result.filler_words.occurrences.len(), 1);
    assert_eq!(result.filler_words.occurrences[0].lexeme, "вот");
    // Not counted, so it still counts as a word.
    assert_eq!(result.words_total, 3);
}

#[test]
fn given_contextual_filler_after_pause_before_content_when_analyzed_then_boosted_and_counted() {
    let tokens = vec![
        word("смотрите", 0.0, 0.5),
        word("ну", 0.9, 1.1), // 0.4s gap before, content word after
        word("погода", 1.2, 1.8),
    ];
    let result = analyze(&transcript(tokens, 2.0));

    assert_eq!(result.filler_words.total, 1);
    assert_eq!(result.filler_words.by_lexeme.get("ну"), Some(&1));
    assert_eq!(result.words_total, 2);
    let occurrence = &result.filler_words.occurrences[0];
    assert_eq!(occurrence.confidence, 0.7);
}

#[test]
fn given_structural_companion_nearby_when_analyzed_then_candidate_suppressed() {
    // "так как" is a conjunction, not a filler.
    let tokens = vec![
        word("так", 0.0, 0.3),
        word("как", 0.35, 0.6),
        word("дождь", 0.65, 1.1),
        word("идем", 1.15, 1.6),
    ];
    let result = analyze(&transcript(tokens, 2.0));

    assert!(result.filler_words.occurrences.is_empty());
    assert_eq!(result.words_total, 4);
}

#[test]
fn given_two_word_lexeme_when_analyzed_then_matched_as_single_occurrence() {
    let tokens = vec![
        word("it", 0.0, 0.2),
        word("was", 0.25, 0.45),
        word("you", 0.9, 1.1), // gap 0.45 boosts the bigram
        word("know", 1.15, 1.4),
        word("difficult", 1.45, 2.1),
    ];
    let result = analyze(&transcript(tokens, 3.0));

    assert_eq!(result.filler_words.total, 1);
    assert_eq!(result.filler_words.by_lexeme.get("you know"), Some(&1));
}

#[test]
fn given_overlapping_tokens_when_analyzed_then_validation_fails() {
    let tokens = vec![word("a", 0.0, 1.0), word("b", 0.5, 1.5)];
    let outcome = SpeechAnalyzer.analyze(&transcript(tokens, 2.0), &AnalyzerConfig::default());

    assert!(matches!(
        outcome,
        Err(ValidationError::OverlappingTokens { index: 1 })
    ));
}

#[test]
fn given_duration_shorter_than_last_token_when_analyzed_then_validation_fails() {
    let tokens = vec![word("a", 0.0, 3.0)];
    let outcome = SpeechAnalyzer.analyze(&transcript(tokens, 2.0), &AnalyzerConfig::default());

    assert!(matches!(
        outcome,
        Err(ValidationError::DurationTooShort { .. })
    ));
}

#[test]
fn given_report_threshold_above_count_threshold_when_validated_then_config_rejected() {
    let config = AnalyzerConfig {
        report_threshold: 0.9,
        count_threshold: 0.5,
        ..AnalyzerConfig::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn given_heavy_filler_rate_when_analyzed_then_warning_note_emitted() {
    // 2 counted fillers against 10 words is 20 per 100, over the heavy band.
    let mut tokens = Vec::new();
    let mut t = 0.0;
    for i in 0..10 {
        tokens.push(word(&format!("слово{i}"), t, t + 0.3));
        t += 0.35;
    }
    tokens.push(hesitation("эм", t + 0.4, t + 0.7));
    tokens.push(hesitation("ээ", t + 1.2, t + 1.5));
    let result = analyze(&transcript(tokens, t + 2.0));

    assert_eq!(result.filler_words.total, 2);
    let note = result
        .advice_notes
        .iter()
        .find(|n| n.category == AdviceCategory::FillerWords)
        .expect("filler note should exist");
    assert_eq!(note.severity, Severity::Warning);
}

#[test]
fn given_mostly_long_pauses_when_analyzed_then_pause_note_suggests_change() {
    let tokens = vec![
        word("начало", 0.0, 1.0),
        word("середина", 4.0, 5.0), // 3.0s long pause
        word("конец", 8.5, 9.5),    // 3.5s long pause
    ];
    let result = analyze(&transcript(tokens, 10.0));

    let note = result
        .advice_notes
        .iter()
        .find(|n| n.category == AdviceCategory::Pauses)
        .expect("pause note should exist");
    assert_eq!(note.severity, Severity::Suggestion);
}

#[test]
fn given_pause_separated_phrases_when_analyzed_then_phrase_stats_reported() {
    fn phrase(words: &[&str], start: f64) -> Vec<podium::domain::TimedToken> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| word(w, start + i as f64 * 0.4, start + i as f64 * 0.4 + 0.3))
            .collect()
    }

    let mut tokens = phrase(&["первая", "фраза", "тут"], 0.0);
    tokens.extend(phrase(&["вторая", "фраза", "здесь"], 3.0));
    tokens.extend(phrase(&["третья", "фраза", "там"], 6.0));
    let result = analyze(&transcript(tokens, 8.0));

    assert_eq!(result.phrases.count, 3);
    assert_eq!(result.phrases.avg_words, 3.0);
    assert_eq!(
        result.phrases.length_classification,
        podium::domain::PhraseLength::ShortPhrases
    );
    assert_eq!(
        result.phrases.rhythm_variation,
        podium::domain::RhythmVariation::Uniform
    );
}

#[test]
fn given_advice_disabled_analysis_when_returned_then_advice_field_is_none() {
    let result = analyze(&steady_150_words());
    assert!(result.advice.is_none());
    assert_eq!(result.advice_notes.len(), 4);
}
