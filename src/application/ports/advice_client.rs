use async_trait::async_trait;

use crate::domain::{Advice, AnalysisResult};

/// Raw advisory collaborator, without any resilience policy. Wrap it in
/// `application::services::AdvisoryService` before handing it to the
/// pipeline.
#[async_trait]
pub trait AdviceClient: Send + Sync {
    async fn request_advice(&self, result: &AnalysisResult) -> Result<Advice, AdviceClientError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AdviceClientError {
    #[error("request timed out")]
    Timeout,
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("authentication failed")]
    Unauthorized,
}

impl AdviceClientError {
    /// Transient failures are worth retrying; the rest fail immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AdviceClientError::Timeout
                | AdviceClientError::ApiRequestFailed(_)
                | AdviceClientError::RateLimited
        )
    }
}
