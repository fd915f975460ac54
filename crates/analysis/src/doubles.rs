//! Analyzer doubles for tests and development.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::analyzer::{Analysis, AnalysisError, DocumentAnalyzer};
use crate::response::parse_analysis;

/// Always replies with the same canned text, parsed like a real upstream
/// response. Used when no backend is configured.
#[derive(Debug, Clone)]
pub struct CannedAnalyzer {
    reply: String,
}

impl CannedAnalyzer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// The development reply used when no backend is configured.
    pub fn mock_review() -> Self {
        Self::new(
            "SCORE: 7.5\n\nFEEDBACK:\n\
             Your document has a clear structure, but the experience section \
             should lead with quantified achievements rather than duties. \
             Add a short professional summary, keep formatting consistent, \
             and proofread for typos.",
        )
    }
}

impl DocumentAnalyzer for CannedAnalyzer {
    fn summarize(&self, _text: &str) -> Result<Analysis, AnalysisError> {
        Ok(parse_analysis(&self.reply))
    }
}

/// Replays pre-scripted outcomes in order and records how many calls it
/// received. Once the script runs dry, further calls fail loudly so a test
/// that loops more than it scripted shows up as a failure, not a hang.
#[derive(Debug)]
pub struct ScriptedAnalyzer {
    script: Mutex<VecDeque<Result<Analysis, AnalysisError>>>,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn new(outcomes: impl IntoIterator<Item = Result<Analysis, AnalysisError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `summarize` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentAnalyzer for ScriptedAnalyzer {
    fn summarize(&self, _text: &str) -> Result<Analysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AnalysisError::Upstream("script exhausted".to_string())))
    }
}
