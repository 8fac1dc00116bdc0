mod mock_audio_extractor;
mod mock_transcription_engine;

pub use mock_audio_extractor::MockAudioExtractor;
pub use mock_transcription_engine::MockTranscriptionEngine;
