//! Text extraction collaborator.

use std::sync::Arc;

use thiserror::Error;

/// Extraction failure. All variants are caller-facing validation problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("document is empty")]
    Empty,

    #[error("document is not valid UTF-8 text")]
    InvalidEncoding,
}

/// Turns an uploaded blob into the plain text the analyzer consumes.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, blob: &[u8], filename: &str) -> Result<String, ExtractError>;
}

impl<E> TextExtractor for Arc<E>
where
    E: TextExtractor + ?Sized,
{
    fn extract(&self, blob: &[u8], filename: &str) -> Result<String, ExtractError> {
        (**self).extract(blob, filename)
    }
}

const SUPPORTED_EXTENSIONS: &[&str] = &[".txt", ".md"];

/// Extractor for plain-text document types.
///
/// Binary formats (docx, pdf) belong to an external converter outside this
/// core; here they are simply unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, blob: &[u8], filename: &str) -> Result<String, ExtractError> {
        let lowered = filename.to_ascii_lowercase();
        if !SUPPORTED_EXTENSIONS
            .iter()
            .any(|ext| lowered.ends_with(ext))
        {
            return Err(ExtractError::UnsupportedType(filename.to_string()));
        }

        let text = std::str::from_utf8(blob).map_err(|_| ExtractError::InvalidEncoding)?;
        if text.trim().is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text.to_string())
    }
}
