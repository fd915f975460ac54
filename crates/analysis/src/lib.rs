//! `critiq-analysis` — external analysis collaborators.
//!
//! **Responsibility:** the seam to the opaque upstream AI call and to text
//! extraction. This crate must not touch ledger, queue, or review state;
//! it turns bytes into text and text into a scored report, nothing more.

pub mod analyzer;
pub mod doubles;
pub mod extract;
pub mod response;

pub use analyzer::{Analysis, AnalysisError, DocumentAnalyzer};
pub use doubles::{CannedAnalyzer, ScriptedAnalyzer};
pub use extract::{ExtractError, PlainTextExtractor, TextExtractor};
pub use response::{parse_analysis, FALLBACK_SCORE};
