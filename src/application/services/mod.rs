mod advisor;
mod analyzer;
mod breaker;
mod gate;
mod pipeline;
mod tiered_cache;

pub use advisor::{AdvisoryPolicy, AdvisoryService, AdvisoryStats};
pub use analyzer::{AdviceRules, AnalyzerConfig, InvalidAnalyzerConfig, SpeechAnalyzer};
pub use breaker::{BreakerOpen, BreakerState, CallPermit, CircuitBreaker};
pub use gate::{AnalysisGate, AnalysisPermit, GateError};
pub use pipeline::{AnalysisError, AnalysisPipeline};
pub use tiered_cache::{CacheStats, TieredCache};
