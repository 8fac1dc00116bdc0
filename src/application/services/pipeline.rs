use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use super::advisor::AdvisoryService;
use super::analyzer::{AnalyzerConfig, InvalidAnalyzerConfig, SpeechAnalyzer};
use super::gate::{AnalysisGate, GateError};
use super::tiered_cache::{CacheStats, TieredCache};
use crate::application::ports::{
    AudioExtractor, ExtractionError, TranscriptionConfig, TranscriptionEngine, TranscriptionError,
};
use crate::domain::{AnalysisResult, Fingerprint, FingerprintParams, ValidationError};

/// Errors produced by the analysis path. Clonable so a failed computation
/// can be fanned out to every coalesced waiter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error(transparent)]
    Overloaded(#[from] GateError),
}

/// Orchestrates one media analysis end to end: fingerprint, cache lookup,
/// admission, extraction, transcription, deterministic analysis and the
/// best-effort advisory stage.
pub struct AnalysisPipeline {
    extractor: Arc<dyn AudioExtractor>,
    engine: Arc<dyn TranscriptionEngine>,
    analyzer: SpeechAnalyzer,
    analyzer_config: AnalyzerConfig,
    transcription: TranscriptionConfig,
    cache: Arc<TieredCache<AnalysisResult, AnalysisError>>,
    gate: Arc<AnalysisGate>,
    advisor: Arc<AdvisoryService>,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: Arc<dyn AudioExtractor>,
        engine: Arc<dyn TranscriptionEngine>,
        analyzer_config: AnalyzerConfig,
        transcription: TranscriptionConfig,
        cache: Arc<TieredCache<AnalysisResult, AnalysisError>>,
        gate: Arc<AnalysisGate>,
        advisor: Arc<AdvisoryService>,
    ) -> Result<Arc<Self>, InvalidAnalyzerConfig> {
        analyzer_config.validate()?;
        Ok(Arc::new(Self {
            extractor,
            engine,
            analyzer: SpeechAnalyzer,
            analyzer_config,
            transcription,
            cache,
            gate,
            advisor,
        }))
    }

    /// Analyzes a media file. Identical media with identical settings is
    /// served from the cache or joined onto an in-flight computation.
    #[instrument(skip_all, fields(bytes = media.len(), advice = advice_enabled))]
    pub async fn analyze_media(
        self: &Arc<Self>,
        media: Arc<[u8]>,
        advice_enabled: bool,
    ) -> Result<AnalysisResult, AnalysisError> {
        let fingerprint = Fingerprint::compute(
            &media,
            &FingerprintParams {
                model: self.transcription.model.clone(),
                language: self.transcription.language.clone(),
                advice_enabled,
            },
        );

        let started = tokio::time::Instant::now();
        let result = self
            .cache
            .get_or_compute(fingerprint, || {
                let pipeline = Arc::clone(self);
                let media = Arc::clone(&media);
                async move { pipeline.run(&media, advice_enabled).await }
            })
            .await?;

        info!(
            %fingerprint,
            elapsed_ms = started.elapsed().as_millis() as u64,
            words = result.words_total,
            "analysis completed"
        );
        Ok(result)
    }

    async fn run(
        &self,
        media: &[u8],
        advice_enabled: bool,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut result = {
            let _permit = self.gate.acquire().await?;
            let audio = self.extractor.extract_audio(media).await?;
            let transcript = self.engine.transcribe(&audio, &self.transcription).await?;
            self.analyzer.analyze(&transcript, &self.analyzer_config)?
        };

        // The permit is released before the advisory call so a slow external
        // service cannot starve the compute capacity.
        if advice_enabled {
            result.advice = Some(self.advisor.get_advice(&result).await);
        }
        Ok(result)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn advisor(&self) -> &AdvisoryService {
        &self.advisor
    }

    pub fn active_analyses(&self) -> usize {
        self.gate.active_count()
    }

    /// Starts the background expiry sweeper for the cache tiers.
    pub fn spawn_cache_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        self.cache.spawn_sweeper(interval)
    }
}
