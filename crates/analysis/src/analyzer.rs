use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Outcome of a successful document analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Human-readable review text.
    pub report: String,
    /// Overall quality score (the pipeline clamps it into its bounds).
    pub score: f64,
}

/// Failure of the upstream analysis call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The provider rejected the call due to rate limiting.
    #[error("analysis rate-limited: {0}")]
    RateLimited(String),

    /// The call exceeded its time budget.
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),

    /// Any other upstream failure; not retried.
    #[error("analysis failed: {0}")]
    Upstream(String),
}

impl AnalysisError {
    /// Rate-limit-class failures are retried with backoff; the rest fail the
    /// review on the spot.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AnalysisError::RateLimited(_) | AnalysisError::Timeout(_)
        )
    }
}

/// External analysis collaborator: `summarize(document) -> (report, score)`.
///
/// Implementations are expected to bound their own call time and surface
/// expiry as `AnalysisError::Timeout`; callers treat the call as a black box
/// that may fail, time out, or be rate-limited.
pub trait DocumentAnalyzer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<Analysis, AnalysisError>;
}

impl<A> DocumentAnalyzer for Arc<A>
where
    A: DocumentAnalyzer + ?Sized,
{
    fn summarize(&self, text: &str) -> Result<Analysis, AnalysisError> {
        (**self).summarize(text)
    }
}
