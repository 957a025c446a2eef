//! Error types for slide deck extraction and comparison.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting or comparing slide decks.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// The deck container is malformed or unreadable (ZIP, XML, or missing parts).
    #[error("Failed to parse deck: {0}")]
    ParseError(String),

    /// None of the input texts produced a single term to vectorize.
    #[error("No text to compare: the decks contain no usable terms")]
    EmptyCorpus,

    /// The optional completion service failed (network, auth, quota).
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl Error {
    /// Whether the caller can report this error and keep going with other work.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::ExternalService(_))
    }
}
