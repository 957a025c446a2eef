//! TF-IDF vectorization and cosine similarity between deck texts.
//!
//! The vocabulary and document frequencies are always fitted over the whole
//! corpus at once (the reference text plus every comparison text), so scores
//! from one call share a single vector space.

use crate::tokenize::Tokenizer;
use crate::{Error, Result, SimilarityReport};
use std::collections::{BTreeMap, BTreeSet};

/// Default number of decimal places scores are rounded to.
pub const DEFAULT_PRECISION: u32 = 4;

/// Sparse term vector keyed by vocabulary index.
///
/// Ordered by index so that sums are evaluated in the same order no matter
/// which side of a comparison a vector is on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<usize, f64>,
}

impl TermVector {
    /// Weight of the term at `index`, zero if absent.
    pub fn get(&self, index: usize) -> f64 {
        self.weights.get(&index).copied().unwrap_or(0.0)
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.weights.len()
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &TermVector) -> f64 {
        self.weights
            .iter()
            .filter_map(|(idx, w)| other.weights.get(idx).map(|o| w * o))
            .sum()
    }

    /// Scale to unit length. Zero vectors are left unchanged.
    fn normalize(&mut self) {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            for w in self.weights.values_mut() {
                *w /= magnitude;
            }
        }
    }
}

/// Cosine similarity between two term vectors.
///
/// Returns 0.0 when either vector has zero magnitude. The result is clamped
/// to [0, 1]; TF-IDF weights are never negative.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let denom = a.magnitude() * b.magnitude();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

/// Most decimal places a score can be rounded to; f64 carries no more.
pub const MAX_PRECISION: u32 = 15;

/// Round a score to `precision` decimal places, capped at [`MAX_PRECISION`].
pub fn round_score(score: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    (score * factor).round() / factor
}

/// TF-IDF vectorizer fitted over a fixed corpus.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    tokenizer: Tokenizer,
    /// Term to column index, columns assigned in lexicographic term order.
    vocabulary: BTreeMap<String, usize>,
    /// Smoothed inverse document frequency per column.
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and IDF weights over `corpus`.
    ///
    /// IDF is smoothed as `ln((1 + n) / (1 + df)) + 1`, so a term present in
    /// every document still carries weight 1.
    pub fn fit(tokenizer: Tokenizer, corpus: &[&str]) -> Result<Self> {
        let documents: Vec<BTreeSet<String>> = corpus
            .iter()
            .map(|text| tokenizer.tokenize(text).into_iter().collect())
            .collect();

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for terms in &documents {
            for term in terms {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        log::debug!(
            "Fitted TF-IDF vocabulary of {} terms over {} documents",
            vocabulary.len(),
            documents.len()
        );

        Ok(Self {
            tokenizer,
            vocabulary,
            idf,
        })
    }

    /// Number of terms in the fitted vocabulary.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column index of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Project text into the fitted space as an L2-normalized TF-IDF vector.
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> TermVector {
        let mut vector = TermVector::default();
        for token in self.tokenizer.tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *vector.weights.entry(index).or_insert(0.0) += 1.0;
            }
        }
        for (index, weight) in vector.weights.iter_mut() {
            *weight *= self.idf[*index];
        }
        vector.normalize();
        vector
    }
}

/// Scores a reference text against comparison texts.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    tokenizer: Tokenizer,
    /// Decimal places scores are rounded to.
    precision: u32,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

impl SimilarityScorer {
    /// Create a scorer with the default tokenizer and 4-decimal rounding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of decimal places scores are rounded to (at most 15).
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision.min(MAX_PRECISION);
        self
    }

    /// Use a custom tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Score `reference` against each of `comparisons`.
    ///
    /// Returns one rounded score per comparison, in input order.
    pub fn score(&self, reference: &str, comparisons: &[&str]) -> Result<Vec<f64>> {
        let mut corpus = Vec::with_capacity(comparisons.len() + 1);
        corpus.push(reference);
        corpus.extend_from_slice(comparisons);

        let vectorizer = TfidfVectorizer::fit(self.tokenizer.clone(), &corpus)?;
        let reference_vector = vectorizer.transform(reference);

        Ok(comparisons
            .iter()
            .map(|text| {
                let vector = vectorizer.transform(text);
                round_score(
                    cosine_similarity(&reference_vector, &vector),
                    self.precision,
                )
            })
            .collect())
    }

    /// Score a reference deck against named comparison decks.
    pub fn compare(
        &self,
        reference_id: &str,
        reference_text: &str,
        comparisons: &[(String, String)],
    ) -> Result<SimilarityReport> {
        let texts: Vec<&str> = comparisons.iter().map(|(_, text)| text.as_str()).collect();
        let scores = self.score(reference_text, &texts)?;

        let mut report = SimilarityReport::new(reference_id);
        for ((id, _), score) in comparisons.iter().zip(scores) {
            report.push_score(id.clone(), score);
        }
        Ok(report)
    }
}

/// Pairwise similarity of two texts, fitted on just those two texts.
pub fn similarity(a: &str, b: &str) -> Result<f64> {
    let scores = SimilarityScorer::new().score(a, &[b])?;
    Ok(scores[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_terms_different_order() {
        let score = similarity("apple banana apple", "banana apple apple").unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_disjoint_vocabularies() {
        let score = similarity("apple apple apple", "zebra zebra zebra").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_identical_text_scores_one() {
        let text = "Quarterly revenue grew in every region except the north";
        assert_eq!(similarity(text, text).unwrap(), 1.0);
    }

    #[test]
    fn test_symmetric() {
        let a = "the cat sat on the mat";
        let b = "the dog sat on the log with the cat";
        assert_eq!(similarity(a, b).unwrap(), similarity(b, a).unwrap());
    }

    #[test]
    fn test_partial_overlap_in_range() {
        let score = similarity("alpha beta gamma", "alpha delta epsilon").unwrap();
        assert!(score > 0.0 && score < 1.0, "score was {}", score);
    }

    #[test]
    fn test_partial_overlap_known_value() {
        // n = 2, shared "alpha" has idf 1, the others ln(3/2) + 1.
        let unique = (1.5f64).ln() + 1.0;
        let expected = 1.0 / (1.0 + 2.0 * unique * unique);
        let score = similarity("alpha beta gamma", "alpha delta epsilon").unwrap();
        assert_eq!(score, round_score(expected, 4));
    }

    #[test]
    fn test_both_empty_is_empty_corpus() {
        assert!(matches!(similarity("", ""), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_only_short_tokens_is_empty_corpus() {
        assert!(matches!(similarity("a b c", "x y"), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_one_side_empty_scores_zero() {
        assert_eq!(similarity("apple banana", "").unwrap(), 0.0);
        assert_eq!(similarity("", "apple banana").unwrap(), 0.0);
    }

    #[test]
    fn test_joint_fit_across_comparisons() {
        let scorer = SimilarityScorer::new();
        let scores = scorer
            .score(
                "apple banana cherry",
                &["apple banana cherry", "banana", "zebra"],
            )
            .unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], 1.0);
        assert!(scores[1] > 0.0 && scores[1] < 1.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let scorer = SimilarityScorer::new();
        let first = scorer.score("one two three", &["two three four"]).unwrap();
        let second = scorer.score("one two three", &["two three four"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(similarity("Hello World", "hello world").unwrap(), 1.0);
    }

    #[test]
    fn test_precision() {
        let scorer = SimilarityScorer::new().with_precision(2);
        let score = scorer
            .score("alpha beta gamma", &["alpha delta epsilon"])
            .unwrap()[0];
        assert_eq!(score, round_score(score, 2));
    }

    #[test]
    fn test_compare_builds_report_in_order() {
        let scorer = SimilarityScorer::new();
        let comparisons = vec![
            ("b.pptx".to_string(), "zebra".to_string()),
            ("a.pptx".to_string(), "apple banana".to_string()),
        ];
        let report = scorer
            .compare("main.pptx", "apple banana", &comparisons)
            .unwrap();

        assert_eq!(report.reference, "main.pptx");
        assert_eq!(report.comparisons[0].id, "b.pptx");
        assert_eq!(report.score_of("b.pptx"), Some(0.0));
        assert_eq!(report.score_of("a.pptx"), Some(1.0));
    }

    #[test]
    fn test_vectorizer_vocabulary_sorted() {
        let vectorizer =
            TfidfVectorizer::fit(Tokenizer::new(), &["zebra apple", "mango"]).unwrap();
        assert_eq!(vectorizer.vocabulary_len(), 3);
        assert_eq!(vectorizer.term_index("apple"), Some(0));
        assert_eq!(vectorizer.term_index("mango"), Some(1));
        assert_eq!(vectorizer.term_index("zebra"), Some(2));
        assert_eq!(vectorizer.term_index("kiwi"), None);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let vectorizer =
            TfidfVectorizer::fit(Tokenizer::new(), &["apple apple banana", "banana"]).unwrap();
        let vector = vectorizer.transform("apple apple banana");
        assert_eq!(vector.nnz(), 2);
        assert!((vector.magnitude() - 1.0).abs() < 1e-12);
        assert!(vector.get(0) > vector.get(1));
    }

    #[test]
    fn test_cosine_zero_vector() {
        let zero = TermVector::default();
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456, 4), 0.1235);
        assert_eq!(round_score(0.99999999, 4), 1.0);
        assert_eq!(round_score(0.5, 0), 1.0);
    }

    #[test]
    fn test_round_score_caps_precision() {
        assert_eq!(round_score(0.25, 400), 0.25);
        assert_eq!(round_score(1.0, u32::MAX), 1.0);
        assert_eq!(round_score(0.123456, 400), round_score(0.123456, MAX_PRECISION));
    }

    #[test]
    fn test_large_precision_stays_in_range() {
        let scores = SimilarityScorer::new()
            .with_precision(400)
            .score("apple banana", &["apple banana", "zebra"])
            .unwrap();
        assert_eq!(scores, vec![1.0, 0.0]);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }
}
