//! Human-readable rendering of similarity reports.
//!
//! Produces one line per compared deck, with failures shown inline so a
//! broken deck never hides the scores of the others.

use crate::SimilarityReport;

/// Formatter for plain-text similarity output.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    /// Decimal places shown for each score.
    precision: usize,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

impl ReportFormatter {
    /// Create a new formatter showing 4 decimal places.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of decimal places shown.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Format a report, one line per comparison.
    ///
    /// # Example output
    /// ```text
    /// main.pptx -> other.pptx  similarity: 0.7312
    /// main.pptx -> broken.pptx  error: Failed to parse deck: not a zip archive
    /// ```
    pub fn format(&self, report: &SimilarityReport) -> String {
        report
            .comparisons
            .iter()
            .map(|c| match (c.score, &c.error) {
                (Some(score), _) => format!(
                    "{} -> {}  similarity: {:.*}",
                    report.reference, c.id, self.precision, score
                ),
                (None, Some(error)) => {
                    format!("{} -> {}  error: {}", report.reference, c.id, error)
                }
                (None, None) => format!("{} -> {}  error: not scored", report.reference, c.id),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format and add a trailing newline.
    pub fn format_with_newline(&self, report: &SimilarityReport) -> String {
        let formatted = self.format(report);
        if formatted.is_empty() {
            formatted
        } else {
            format!("{}\n", formatted)
        }
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_empty_report() {
        let formatter = ReportFormatter::new();
        let report = SimilarityReport::new("main.pptx");
        assert_eq!(formatter.format(&report), "");
        assert_eq!(formatter.format_with_newline(&report), "");
    }

    #[test]
    fn test_format_scores_with_fixed_decimals() {
        let formatter = ReportFormatter::new();
        let mut report = SimilarityReport::new("main.pptx");
        report.push_score("a.pptx", 0.73);
        report.push_score("b.pptx", 1.0);

        assert_eq!(
            formatter.format(&report),
            "main.pptx -> a.pptx  similarity: 0.7300\nmain.pptx -> b.pptx  similarity: 1.0000"
        );
    }

    #[test]
    fn test_format_failure_inline() {
        let formatter = ReportFormatter::new();
        let mut report = SimilarityReport::new("main.pptx");
        report.push_failure("broken.pptx", "Failed to parse deck: bad zip");
        report.push_score("ok.pptx", 0.5);

        let output = formatter.format_with_newline(&report);
        assert_eq!(
            output,
            "main.pptx -> broken.pptx  error: Failed to parse deck: bad zip\n\
             main.pptx -> ok.pptx  similarity: 0.5000\n"
        );
    }

    #[test]
    fn test_custom_precision() {
        let formatter = ReportFormatter::new().with_precision(2);
        let mut report = SimilarityReport::new("main.pptx");
        report.push_score("a.pptx", 0.256);
        assert_eq!(
            formatter.format(&report),
            "main.pptx -> a.pptx  similarity: 0.26"
        );
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("Hello", 300), "Hello");
        assert_eq!(preview("", 300), "");
    }

    #[test]
    fn test_preview_cuts_on_characters() {
        assert_eq!(preview("Hello World", 5), "Hello...");
        assert_eq!(preview("簡報相似度", 2), "簡報...");
    }

    #[test]
    fn test_preview_exact_length_not_cut() {
        assert_eq!(preview("Hello", 5), "Hello");
    }
}
