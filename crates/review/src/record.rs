use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critiq_core::{AccountId, ReviewId};

/// Lower bound of a review score.
pub const SCORE_MIN: f64 = 1.0;
/// Upper bound of a review score.
pub const SCORE_MAX: f64 = 10.0;

/// Lifecycle of a review submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Created, waiting in the queue.
    Pending,
    /// Claimed by a worker; the analysis call is in flight.
    Processing,
    /// Analysis succeeded; report and score are set.
    Completed,
    /// Analysis failed after retries; no report, credits refunded.
    Failed,
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewStatus::Completed | ReviewStatus::Failed)
    }
}

impl core::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Processing => "processing",
            ReviewStatus::Completed => "completed",
            ReviewStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Rejected state transition. Terminal states are sticky, and `Processing`
/// may only be entered from `Pending` (double-claim protection).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("review {id} is {status}, expected pending")]
    NotPending { id: ReviewId, status: ReviewStatus },

    #[error("review {id} is {status}, expected processing")]
    NotProcessing { id: ReviewId, status: ReviewStatus },
}

/// One document submission and its review outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub account_id: AccountId,
    /// Original file name, for display and notifications.
    pub document_name: String,
    /// Extracted text the analyzer sees.
    pub document_text: String,
    /// Credits debited at submit time; the refund on failure reverses this.
    pub cost: i64,
    pub status: ReviewStatus,
    /// Set only on `Completed`.
    pub report: Option<String>,
    /// Set only on `Completed`; clamped to `SCORE_MIN..=SCORE_MAX`.
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(
        account_id: AccountId,
        document_name: impl Into<String>,
        document_text: impl Into<String>,
        cost: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReviewId::new(),
            account_id,
            document_name: document_name.into(),
            document_text: document_text.into(),
            cost,
            status: ReviewStatus::Pending,
            report: None,
            score: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `Pending → Processing`. Only the worker that claimed the queue entry
    /// calls this; any other state means the record was already claimed or
    /// finished, and the caller must skip it.
    pub fn start_processing(&mut self) -> Result<(), TransitionError> {
        if self.status != ReviewStatus::Pending {
            return Err(TransitionError::NotPending {
                id: self.id,
                status: self.status,
            });
        }
        self.status = ReviewStatus::Processing;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `Processing → Completed`. Clamps the score into
    /// `SCORE_MIN..=SCORE_MAX`.
    pub fn complete(&mut self, report: impl Into<String>, score: f64) -> Result<(), TransitionError> {
        self.ensure_processing()?;
        self.report = Some(report.into());
        self.score = Some(score.clamp(SCORE_MIN, SCORE_MAX));
        self.status = ReviewStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `Processing → Failed`. Stores no report; the failure reason travels
    /// only through notifications.
    pub fn fail(&mut self) -> Result<(), TransitionError> {
        self.ensure_processing()?;
        self.status = ReviewStatus::Failed;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_processing(&self) -> Result<(), TransitionError> {
        if self.status != ReviewStatus::Processing {
            return Err(TransitionError::NotProcessing {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ReviewRecord {
        ReviewRecord::new(AccountId::new(), "cv.txt", "some text", 1)
    }

    #[test]
    fn happy_path_walks_forward_only() {
        let mut r = record();
        assert_eq!(r.status, ReviewStatus::Pending);

        r.start_processing().unwrap();
        assert_eq!(r.status, ReviewStatus::Processing);

        r.complete("Good CV", 8.5).unwrap();
        assert_eq!(r.status, ReviewStatus::Completed);
        assert_eq!(r.report.as_deref(), Some("Good CV"));
        assert_eq!(r.score, Some(8.5));
    }

    #[test]
    fn double_claim_is_rejected() {
        let mut r = record();
        r.start_processing().unwrap();

        let err = r.start_processing().unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotPending {
                id: r.id,
                status: ReviewStatus::Processing
            }
        );
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut r = record();
        r.start_processing().unwrap();
        r.fail().unwrap();

        assert!(r.fail().is_err());
        assert!(r.complete("late", 9.0).is_err());
        assert!(r.start_processing().is_err());
        assert_eq!(r.status, ReviewStatus::Failed);
        assert!(r.report.is_none());
    }

    #[test]
    fn completion_cannot_skip_processing() {
        let mut r = record();
        assert!(r.complete("too early", 5.0).is_err());
        assert_eq!(r.status, ReviewStatus::Pending);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let mut r = record();
        r.start_processing().unwrap();
        r.complete("spectacular", 42.0).unwrap();
        assert_eq!(r.score, Some(SCORE_MAX));

        let mut r = record();
        r.start_processing().unwrap();
        r.complete("grim", -3.0).unwrap();
        assert_eq!(r.score, Some(SCORE_MIN));
    }

    #[test]
    fn failed_records_carry_no_result() {
        let mut r = record();
        r.start_processing().unwrap();
        r.fail().unwrap();
        assert!(r.report.is_none());
        assert!(r.score.is_none());
    }
}
