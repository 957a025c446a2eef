//! Domain types for extracted deck content and comparison results.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a slide deck comes from.
#[derive(Debug, Clone)]
pub enum DeckSource {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory buffer, e.g. bytes received from an upload.
    Bytes {
        /// Display name used to identify the deck in reports.
        name: String,
        /// Raw container bytes.
        data: Vec<u8>,
    },
}

impl DeckSource {
    /// Create a source from a file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Create a source from an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data,
        }
    }

    /// Identifier used for this deck in reports.
    ///
    /// For files this is the path as given by the caller, so two decks with
    /// the same filename in different directories stay distinguishable.
    pub fn id(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    /// Bare filename (without directories).
    pub fn filename(&self) -> &str {
        match self {
            Self::Path(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown"),
            Self::Bytes { name, .. } => Path::new(name)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(name.as_str()),
        }
    }
}

/// Represents an entire presentation with its extracted content.
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: PresentationFormat,

    /// Slides in presentation order.
    pub slides: Vec<ExtractedSlide>,
}

impl Presentation {
    /// Create a new presentation with the given filename and format.
    pub fn new(filename: impl Into<String>, format: PresentationFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: ExtractedSlide) {
        self.slides.push(slide);
    }

    /// Get all shape texts from all slides, flattened in slide then shape order.
    pub fn all_texts(&self) -> Vec<&str> {
        self.slides
            .iter()
            .flat_map(|s| s.texts.iter().map(|t| t.text.as_str()))
            .collect()
    }

    /// All shape texts joined by a single space.
    ///
    /// Empty-text filtering already happened at parse time, so every kept
    /// shape contributes exactly one element to the join.
    pub fn extracted_text(&self) -> String {
        self.all_texts().join(" ")
    }
}

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Detected only so it can be rejected clearly.
    LegacyPpt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::LegacyPpt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::LegacyPpt);
        }

        None
    }
}

/// What to do with shapes that can hold text but whose text is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyShapePolicy {
    /// Drop empty and whitespace-only shape texts.
    #[default]
    Skip,
    /// Keep them as empty contributions to the joined text.
    Keep,
}

/// A single extracted slide.
#[derive(Debug, Clone)]
pub struct ExtractedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Shape texts on this slide, in document order.
    pub texts: Vec<SlideText>,
}

impl ExtractedSlide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            texts: Vec::new(),
        }
    }

    /// Add the text of one shape to this slide.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.texts.push(SlideText::new(text));
    }
}

/// Text content of one text-bearing shape.
#[derive(Debug, Clone)]
pub struct SlideText {
    /// Paragraphs of the shape joined by `\n`.
    pub text: String,
}

impl SlideText {
    /// Create new slide text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Outcome of comparing the reference deck with one other deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Identifier of the compared deck.
    pub id: String,

    /// Rounded similarity score in [0, 1], if the deck could be scored.
    pub score: Option<f64>,

    /// Why the deck could not be scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Similarity of one reference deck against a list of other decks.
///
/// Comparisons keep the order in which the caller supplied them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityReport {
    /// Identifier of the reference deck.
    pub reference: String,

    /// One entry per compared deck.
    pub comparisons: Vec<Comparison>,
}

impl SimilarityReport {
    /// Create an empty report for the given reference deck.
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            comparisons: Vec::new(),
        }
    }

    /// Record a successful comparison.
    pub fn push_score(&mut self, id: impl Into<String>, score: f64) {
        self.comparisons.push(Comparison {
            id: id.into(),
            score: Some(score),
            error: None,
        });
    }

    /// Record a comparison that failed before it could be scored.
    pub fn push_failure(&mut self, id: impl Into<String>, error: impl ToString) {
        self.comparisons.push(Comparison {
            id: id.into(),
            score: None,
            error: Some(error.to_string()),
        });
    }

    /// Look up the score for a compared deck.
    pub fn score_of(&self, id: &str) -> Option<f64> {
        self.comparisons
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.score)
    }

    /// Number of comparisons that failed.
    pub fn failure_count(&self) -> usize {
        self.comparisons.iter().filter(|c| c.error.is_some()).count()
    }
}
