use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::domain::{
    AdviceCategory, AdviceNote, AnalysisResult, FillerOccurrence, FillerStats, PauseClass,
    PauseSpan, PauseStats, PhraseLength, PhraseStats, RhythmVariation, Severity, TimedTranscript,
    TokenKind, ValidationError,
};

/// Immutable analysis configuration, passed in at call time. Thresholds and
/// the filler lexicon are data, not code, so they can be tuned without a
/// recompile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// A gap between tokens shorter than this is not a pause at all.
    pub min_pause_sec: f64,
    pub pause_normal_sec: f64,
    pub pause_long_sec: f64,
    pub pause_thinking_sec: f64,
    /// Below this much speaking time, words-per-minute is reported as 0.
    pub min_speaking_time_sec: f64,
    /// Canonical lexeme forms, pre-normalized (one or two words).
    pub filler_lexicon: Vec<String>,
    /// Lexemes that also carry a legitimate structural sense and therefore
    /// start at a lower base confidence.
    pub contextual_lexemes: HashSet<String>,
    /// Neighbor words that indicate the structural (non-filler) sense of a
    /// contextual lexeme when seen inside the context window.
    pub structural_companions: HashMap<String, Vec<String>>,
    /// Tokens inspected on each side of a candidate.
    pub context_window: usize,
    pub base_confidence: f64,
    pub contextual_base_confidence: f64,
    /// A preceding gap at least this long counts as a "short pause" for the
    /// confidence boost.
    pub pause_boost_sec: f64,
    pub context_boost: f64,
    pub structural_suppression: f64,
    /// Confidence needed for an occurrence to enter the numeric rate.
    pub count_threshold: f64,
    /// Lower bar for keeping an occurrence in the report.
    pub report_threshold: f64,
    pub advice_rules: AdviceRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdviceRules {
    pub min_comfort_wpm: f64,
    pub max_comfort_wpm: f64,
    pub filler_light_per_100: f64,
    pub filler_heavy_per_100: f64,
    pub long_pause_fraction: f64,
    pub short_phrase_words: f64,
    pub long_phrase_words: f64,
}

impl Default for AdviceRules {
    fn default() -> Self {
        Self {
            min_comfort_wpm: 100.0,
            max_comfort_wpm: 180.0,
            filler_light_per_100: 3.0,
            filler_heavy_per_100: 8.0,
            long_pause_fraction: 0.3,
            short_phrase_words: 8.0,
            long_phrase_words: 25.0,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let filler_lexicon = [
            "э э", "эм", "мм", "ну", "вот", "так", "да", "типа", "как бы", "то есть", "значит",
            "короче", "в общем", "получается", "собственно", "вроде", "кстати", "um", "uh", "er",
            "ah", "like", "so", "well", "right", "you know", "i mean", "kind of", "sort of",
            "basically", "actually", "okay",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let contextual_lexemes = [
            "ну", "вот", "так", "да", "значит", "то есть", "вроде", "получается", "like", "so",
            "well", "right", "actually",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let structural_companions: HashMap<String, Vec<String>> = [
            ("так", vec!["как", "что", "же"]),
            ("да", vec!["и", "нет"]),
            ("вот", vec!["этот", "эта", "это"]),
            ("like", vec!["would", "i", "we", "they", "dont", "not"]),
            ("so", vec!["that", "far", "much", "many"]),
            ("well", vec!["as", "very", "done"]),
            ("right", vec!["now", "turn", "here"]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into_iter().map(str::to_string).collect()))
        .collect();

        Self {
            min_pause_sec: 0.5,
            pause_normal_sec: 1.0,
            pause_long_sec: 2.5,
            pause_thinking_sec: 4.0,
            min_speaking_time_sec: 1.0,
            filler_lexicon,
            contextual_lexemes,
            structural_companions,
            context_window: 2,
            base_confidence: 0.8,
            contextual_base_confidence: 0.5,
            pause_boost_sec: 0.3,
            context_boost: 0.2,
            structural_suppression: 0.3,
            count_threshold: 0.6,
            report_threshold: 0.35,
            advice_rules: AdviceRules::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), InvalidAnalyzerConfig> {
        if self.report_threshold > self.count_threshold {
            return Err(InvalidAnalyzerConfig::ThresholdOrder {
                report: self.report_threshold,
                count: self.count_threshold,
            });
        }
        if !(self.pause_normal_sec <= self.pause_long_sec
            && self.pause_long_sec <= self.pause_thinking_sec)
        {
            return Err(InvalidAnalyzerConfig::PauseThresholdOrder);
        }
        if self.min_pause_sec <= 0.0 {
            return Err(InvalidAnalyzerConfig::NonPositiveMinPause);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidAnalyzerConfig {
    #[error("report threshold {report} must not exceed count threshold {count}")]
    ThresholdOrder { report: f64, count: f64 },
    #[error("pause thresholds must be ordered normal <= long <= thinking")]
    PauseThresholdOrder,
    #[error("min_pause_sec must be positive")]
    NonPositiveMinPause,
}

/// Pure transcript analyzer. No I/O, no state: the same transcript and
/// config always produce a byte-identical result, which the cache relies on.
#[derive(Debug, Default, Clone)]
pub struct SpeechAnalyzer;

impl SpeechAnalyzer {
    pub fn analyze(
        &self,
        transcript: &TimedTranscript,
        config: &AnalyzerConfig,
    ) -> Result<AnalysisResult, ValidationError> {
        transcript.validate()?;

        let duration_sec = transcript.duration_sec;
        let speaking_time_sec: f64 = transcript.tokens.iter().map(|t| t.duration()).sum();

        let pauses = extract_pauses(transcript, config);
        let fillers = detect_fillers(transcript, config);

        let counted_indices: HashSet<usize> = fillers
            .iter()
            .filter(|f| f.counted)
            .map(|f| f.occurrence.token_index)
            .collect();

        let words_total = transcript
            .tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| t.kind == TokenKind::Word && !counted_indices.contains(i))
            .count();

        let words_per_minute = if speaking_time_sec < config.min_speaking_time_sec
            || words_total == 0
        {
            0.0
        } else {
            round1(words_total as f64 / (speaking_time_sec / 60.0))
        };

        let speaking_ratio = if duration_sec > 0.0 {
            round3(speaking_time_sec / duration_sec)
        } else {
            0.0
        };

        let filler_stats = summarize_fillers(&fillers, words_total);
        let pause_stats = summarize_pauses(&pauses);
        let phrase_stats = build_phrase_stats(transcript, &pauses);
        let advice_notes = generate_advice(
            &config.advice_rules,
            words_per_minute,
            words_total,
            &filler_stats,
            &pause_stats,
            &phrase_stats,
        );

        Ok(AnalysisResult {
            duration_sec: round2(duration_sec),
            speaking_time_sec: round2(speaking_time_sec),
            speaking_ratio,
            words_total,
            words_per_minute,
            language: transcript.language.clone(),
            filler_words: filler_stats,
            pauses: pause_stats,
            phrases: phrase_stats,
            advice_notes,
            advice: None,
        })
    }
}

struct ScoredFiller {
    occurrence: FillerOccurrence,
    counted: bool,
}

fn extract_pauses(transcript: &TimedTranscript, config: &AnalyzerConfig) -> Vec<PauseSpan> {
    let mut pauses = Vec::new();
    for pair in transcript.tokens.windows(2) {
        let gap = pair[1].start - pair[0].end;
        if gap >= config.min_pause_sec {
            pauses.push(PauseSpan {
                start: round2(pair[0].end),
                end: round2(pair[1].start),
                duration_sec: round2(gap),
                classification: classify_pause(gap, config),
            });
        }
    }
    pauses
}

/// Thresholds are evaluated longest first; an exact match on a boundary
/// takes the higher severity class.
fn classify_pause(gap: f64, config: &AnalyzerConfig) -> PauseClass {
    if gap >= config.pause_thinking_sec {
        PauseClass::Thinking
    } else if gap >= config.pause_long_sec {
        PauseClass::Long
    } else if gap >= config.pause_normal_sec {
        PauseClass::Normal
    } else {
        PauseClass::Micro
    }
}

/// Normalizes a token for lexicon matching: lowercase, diacritics folded,
/// punctuation stripped, letter runs collapsed ("эээ" -> "ээ"), hyphens
/// treated as spaces.
fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '-' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut collapsed = String::with_capacity(folded.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in folded.chars() {
        if prev == Some(c) {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        if run <= 2 {
            collapsed.push(c);
        }
    }

    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn detect_fillers(transcript: &TimedTranscript, config: &AnalyzerConfig) -> Vec<ScoredFiller> {
    let tokens = &transcript.tokens;
    let normalized: Vec<String> = tokens.iter().map(|t| normalize(&t.text)).collect();
    let lexicon: HashSet<&str> = config.filler_lexicon.iter().map(String::as_str).collect();

    let mut fillers = Vec::new();
    let mut consumed_by_bigram: Option<usize> = None;

    for i in 0..tokens.len() {
        if consumed_by_bigram == Some(i) {
            continue;
        }

        // Two-word lexemes ("как бы", "you know") take precedence over a
        // single-word match on their first token.
        let mut lexeme: Option<String> = None;
        if i + 1 < tokens.len() {
            let joined = format!("{} {}", normalized[i], normalized[i + 1]);
            if lexicon.contains(joined.as_str()) {
                lexeme = Some(joined);
                consumed_by_bigram = Some(i + 1);
            }
        }
        if lexeme.is_none() {
            if tokens[i].kind == TokenKind::FillerCandidate {
                lexeme = Some(normalized[i].clone());
            } else if lexicon.contains(normalized[i].as_str()) {
                lexeme = Some(normalized[i].clone());
            }
        }
        let Some(lexeme) = lexeme else { continue };
        if lexeme.is_empty() {
            continue;
        }

        let confidence = score_candidate(transcript, &normalized, i, &lexeme, &lexicon, config);
        if confidence < config.report_threshold {
            continue;
        }

        let counted = confidence >= config.count_threshold;
        fillers.push(ScoredFiller {
            occurrence: FillerOccurrence {
                token_index: i,
                lexeme,
                exact_text: tokens[i].text.clone(),
                start_sec: round3(tokens[i].start),
                context_before: context_text(transcript, i, config.context_window, true),
                context_after: context_text(transcript, i, config.context_window, false),
                confidence,
            },
            counted,
        });
    }

    fillers
}

fn score_candidate(
    transcript: &TimedTranscript,
    normalized: &[String],
    index: usize,
    lexeme: &str,
    lexicon: &HashSet<&str>,
    config: &AnalyzerConfig,
) -> f64 {
    let tokens = &transcript.tokens;
    let token = &tokens[index];

    let mut confidence = if token.kind == TokenKind::FillerCandidate {
        config.base_confidence
    } else if config.contextual_lexemes.contains(lexeme) {
        config.contextual_base_confidence
    } else {
        config.base_confidence
    };

    // Boost: the token sits right after a short pause and right before a
    // content word — the classic disfluency position.
    let after_short_pause = index > 0
        && (token.start - tokens[index - 1].end) >= config.pause_boost_sec;
    let before_content_word = tokens
        .get(index + 1)
        .map(|next| {
            next.kind == TokenKind::Word && !lexicon.contains(normalized[index + 1].as_str())
        })
        .unwrap_or(false);
    if after_short_pause && before_content_word {
        confidence += config.context_boost;
    }

    // Suppression: a structural companion nearby means the lexeme is likely
    // carrying its non-filler sense ("так как", "so that").
    if config.contextual_lexemes.contains(lexeme) {
        if let Some(companions) = config.structural_companions.get(lexeme) {
            let lo = index.saturating_sub(config.context_window);
            let hi = (index + config.context_window + 1).min(tokens.len());
            let has_companion = (lo..hi)
                .filter(|&j| j != index)
                .any(|j| companions.iter().any(|c| c == &normalized[j]));
            if has_companion {
                confidence -= config.structural_suppression;
            }
        }
    }

    round3(confidence.clamp(0.0, 1.0))
}

fn context_text(
    transcript: &TimedTranscript,
    index: usize,
    window: usize,
    before: bool,
) -> String {
    let tokens = &transcript.tokens;
    let range = if before {
        index.saturating_sub(window)..index
    } else {
        (index + 1)..(index + 1 + window).min(tokens.len())
    };
    tokens[range]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn summarize_fillers(fillers: &[ScoredFiller], words_total: usize) -> FillerStats {
    let mut by_lexeme: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;
    for filler in fillers.iter().filter(|f| f.counted) {
        *by_lexeme.entry(filler.occurrence.lexeme.clone()).or_insert(0) += 1;
        total += 1;
    }

    let per_100_words = if words_total > 0 {
        round1(total as f64 / words_total as f64 * 100.0)
    } else {
        0.0
    };

    FillerStats {
        total,
        per_100_words,
        by_lexeme,
        occurrences: fillers.iter().map(|f| f.occurrence.clone()).collect(),
    }
}

fn summarize_pauses(pauses: &[PauseSpan]) -> PauseStats {
    if pauses.is_empty() {
        return PauseStats {
            count: 0,
            avg_sec: 0.0,
            max_sec: 0.0,
            spans: Vec::new(),
        };
    }
    let count = pauses.len();
    let sum: f64 = pauses.iter().map(|p| p.duration_sec).sum();
    let max = pauses
        .iter()
        .map(|p| p.duration_sec)
        .fold(0.0f64, f64::max);
    PauseStats {
        count,
        avg_sec: round2(sum / count as f64),
        max_sec: round2(max),
        spans: pauses.to_vec(),
    }
}

/// Phrases are runs of tokens between pauses; their length and duration
/// spread describe the rhythm of the delivery.
fn build_phrase_stats(transcript: &TimedTranscript, pauses: &[PauseSpan]) -> PhraseStats {
    let tokens = &transcript.tokens;
    if tokens.is_empty() {
        return PhraseStats {
            count: 0,
            avg_words: 0.0,
            avg_duration_sec: 0.0,
            length_classification: PhraseLength::InsufficientData,
            rhythm_variation: RhythmVariation::InsufficientData,
        };
    }

    let boundary_starts: HashSet<u64> = pauses.iter().map(|p| p.end.to_bits()).collect();

    let mut word_counts: Vec<usize> = Vec::new();
    let mut durations: Vec<f64> = Vec::new();
    let mut phrase_start = 0usize;
    for i in 0..tokens.len() {
        let next_starts_phrase = tokens
            .get(i + 1)
            .map(|next| boundary_starts.contains(&round2(next.start).to_bits()))
            .unwrap_or(true);
        if next_starts_phrase {
            let slice = &tokens[phrase_start..=i];
            let duration = slice.last().map(|t| t.end).unwrap_or(0.0)
                - slice.first().map(|t| t.start).unwrap_or(0.0);
            if !slice.is_empty() && duration > 0.0 {
                word_counts.push(slice.len());
                durations.push(duration);
            }
            phrase_start = i + 1;
        }
    }

    if word_counts.is_empty() {
        return PhraseStats {
            count: 0,
            avg_words: 0.0,
            avg_duration_sec: 0.0,
            length_classification: PhraseLength::InsufficientData,
            rhythm_variation: RhythmVariation::InsufficientData,
        };
    }

    let count = word_counts.len();
    let avg_words = word_counts.iter().sum::<usize>() as f64 / count as f64;
    let avg_duration = durations.iter().sum::<f64>() / count as f64;

    let length_classification = if avg_words < 8.0 {
        PhraseLength::ShortPhrases
    } else if avg_words <= 25.0 {
        PhraseLength::Balanced
    } else {
        PhraseLength::LongPhrases
    };

    let rhythm_variation = if count < 2 || avg_duration <= 0.0 {
        RhythmVariation::InsufficientData
    } else {
        let variance = durations
            .iter()
            .map(|d| (d - avg_duration).powi(2))
            .sum::<f64>()
            / count as f64;
        let cv = variance.sqrt() / avg_duration;
        if cv < 0.25 {
            RhythmVariation::Uniform
        } else if cv < 0.6 {
            RhythmVariation::ModeratelyVariable
        } else {
            RhythmVariation::HighlyVariable
        }
    };

    PhraseStats {
        count,
        avg_words: round1(avg_words),
        avg_duration_sec: round2(avg_duration),
        length_classification,
        rhythm_variation,
    }
}

fn generate_advice(
    rules: &AdviceRules,
    words_per_minute: f64,
    words_total: usize,
    fillers: &FillerStats,
    pauses: &PauseStats,
    phrases: &PhraseStats,
) -> Vec<AdviceNote> {
    let mut notes = Vec::with_capacity(4);

    let (severity, observation, recommendation) = if words_total == 0 || words_per_minute == 0.0 {
        (
            Severity::Info,
            "Too little recognized speech to assess the speaking rate.".to_string(),
            "Record a longer fragment with clearly audible speech.".to_string(),
        )
    } else if words_per_minute < rules.min_comfort_wpm {
        (
            Severity::Suggestion,
            format!(
                "Speaking rate is about {words_per_minute:.1} words per minute, below the \
                 comfortable range of {:.0}-{:.0}.",
                rules.min_comfort_wpm, rules.max_comfort_wpm
            ),
            "Tighten the phrasing and trim excess pauses for a more dynamic delivery."
                .to_string(),
        )
    } else if words_per_minute > rules.max_comfort_wpm {
        (
            Severity::Suggestion,
            format!(
                "Speaking rate is about {words_per_minute:.1} words per minute, above the \
                 comfortable range of {:.0}-{:.0}.",
                rules.min_comfort_wpm, rules.max_comfort_wpm
            ),
            "Slow down slightly and use deliberate pauses to emphasize key points.".to_string(),
        )
    } else {
        (
            Severity::Info,
            format!(
                "Speaking rate is about {words_per_minute:.1} words per minute, within the \
                 comfortable range."
            ),
            "Keep this pace and vary it to highlight important passages.".to_string(),
        )
    };
    notes.push(AdviceNote {
        category: AdviceCategory::SpeechRate,
        severity,
        observation,
        recommendation,
    });

    let (severity, observation, recommendation) = if fillers.total == 0 {
        (
            Severity::Info,
            "No common filler words were detected.".to_string(),
            "Keep the current level of control over the delivery.".to_string(),
        )
    } else if fillers.per_100_words <= rules.filler_light_per_100 {
        (
            Severity::Info,
            format!(
                "Filler words appear at a low rate of {:.1} per 100 words.",
                fillers.per_100_words
            ),
            "This level rarely distracts listeners; a brief pause can replace the rest."
                .to_string(),
        )
    } else if fillers.per_100_words <= rules.filler_heavy_per_100 {
        (
            Severity::Suggestion,
            format!(
                "Filler words appear at a rate of {:.1} per 100 words.",
                fillers.per_100_words
            ),
            "Replace the most frequent fillers with short silent pauses.".to_string(),
        )
    } else {
        (
            Severity::Warning,
            format!(
                "Filler words appear at a high rate of {:.1} per 100 words.",
                fillers.per_100_words
            ),
            "Practice the material and substitute deliberate pauses for automatic fillers."
                .to_string(),
        )
    };
    notes.push(AdviceNote {
        category: AdviceCategory::FillerWords,
        severity,
        observation,
        recommendation,
    });

    let long_count = pauses
        .spans
        .iter()
        .filter(|p| p.classification >= PauseClass::Long)
        .count();
    let long_fraction = if pauses.count > 0 {
        long_count as f64 / pauses.count as f64
    } else {
        0.0
    };
    let (severity, observation, recommendation) = if pauses.count == 0 {
        (
            Severity::Info,
            "Almost no pauses separate the recognized speech fragments.".to_string(),
            "Short intentional pauses help the audience follow the structure.".to_string(),
        )
    } else if long_count > 0 && long_fraction > rules.long_pause_fraction {
        (
            Severity::Suggestion,
            format!(
                "Long pauses (up to {:.1}s) make up a large share of all pauses.",
                pauses.max_sec
            ),
            "Prepare transitions between sections so long gaps become bridging phrases."
                .to_string(),
        )
    } else {
        (
            Severity::Info,
            format!(
                "Pauses average {:.1}s and their use sounds natural.",
                pauses.avg_sec
            ),
            "Keep this balance; pauses give the audience time to absorb the material."
                .to_string(),
        )
    };
    notes.push(AdviceNote {
        category: AdviceCategory::Pauses,
        severity,
        observation,
        recommendation,
    });

    let (severity, observation, recommendation) = if phrases.count <= 1 {
        (
            Severity::Info,
            "The recording is a single uninterrupted fragment, so phrase structure cannot be \
             assessed."
                .to_string(),
            "Use pauses between completed thoughts to give the talk visible structure."
                .to_string(),
        )
    } else {
        match phrases.length_classification {
            PhraseLength::ShortPhrases => (
                Severity::Suggestion,
                format!(
                    "Phrases average {:.1} words, which can sound fragmented.",
                    phrases.avg_words
                ),
                "Merge closely related sentences into fuller phrases.".to_string(),
            ),
            PhraseLength::LongPhrases => (
                Severity::Suggestion,
                format!(
                    "Phrases average {:.1} words, which is hard to follow by ear.",
                    phrases.avg_words
                ),
                "Split the longest phrases and add explicit connectives.".to_string(),
            ),
            _ => (
                Severity::Info,
                format!(
                    "Phrases average {:.1} words; the structure is balanced.",
                    phrases.avg_words
                ),
                "Keep alternating medium-length phrases.".to_string(),
            ),
        }
    };
    notes.push(AdviceNote {
        category: AdviceCategory::Phrasing,
        severity,
        observation,
        recommendation,
    });

    notes
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_punctuation_and_repeats() {
        assert_eq!(normalize("Ну,"), "ну");
        assert_eq!(normalize("эээ"), "ээ");
        assert_eq!(normalize("э-э"), "э э");
        assert_eq!(normalize("Okay!"), "okay");
    }

    #[test]
    fn normalize_folds_diacritics() {
        assert_eq!(normalize("всё"), "все");
    }

    #[test]
    fn pause_classification_uses_inclusive_lower_bounds() {
        let config = AnalyzerConfig::default();
        assert_eq!(
            classify_pause(config.pause_long_sec, &config),
            PauseClass::Long
        );
        assert_eq!(
            classify_pause(config.pause_long_sec - 1e-9, &config),
            PauseClass::Normal
        );
        assert_eq!(
            classify_pause(config.pause_thinking_sec, &config),
            PauseClass::Thinking
        );
    }
}
