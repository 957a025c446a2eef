//! Core domain types, TF-IDF similarity scoring, and report formatting
//! for slide deck comparison.

pub mod error;
pub mod report;
pub mod similarity;
pub mod summary;
pub mod tokenize;
pub mod types;

pub use error::{Error, Result};
pub use report::{preview, ReportFormatter};
pub use similarity::{cosine_similarity, similarity, SimilarityScorer, TfidfVectorizer};
pub use summary::{CompletionClient, SummaryConfig, Summarizer};
pub use tokenize::Tokenizer;
pub use types::{
    Comparison, DeckSource, EmptyShapePolicy, ExtractedSlide, Presentation, PresentationFormat,
    SimilarityReport, SlideText,
};
