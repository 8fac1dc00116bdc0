mod advice_client;
mod audio_extractor;
mod cache_tier;
mod transcription_engine;

pub use advice_client::{AdviceClient, AdviceClientError};
pub use audio_extractor::{AudioExtractor, ExtractionError, NormalizedAudio};
pub use cache_tier::CacheTier;
pub use transcription_engine::{TranscriptionConfig, TranscriptionEngine, TranscriptionError};
