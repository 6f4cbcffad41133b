// src/matcher.rs
//! Bag-of-words cosine similarity between keyword phrases and review texts.
//!
//! A single vocabulary is fit jointly over the keyword phrases and the
//! normalized reviews (keywords first), so both live in the same raw
//! term-count vector space. No idf weighting.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Minimum cosine similarity (strict) for a review to count as relevant
/// to a keyword.
pub const DEFAULT_THRESHOLD: f64 = 0.05;

// Word tokens of length >= 2; single-letter tokens carry no signal for
// phrase matching.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token regex"));

fn tokens(text: &str) -> impl Iterator<Item = &str> + '_ {
    TOKEN_RE.find_iter(text).map(|m| m.as_str())
}

/// Dense (keywords x reviews) similarity matrix. Rebuilt from scratch for
/// every run; scores are not comparable across runs whose vocabularies
/// differ.
#[derive(Debug)]
pub struct SimilarityMatrix {
    keywords: usize,
    reviews: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Fit the joint vocabulary and compute cosine similarity for every
    /// (keyword, review) pair. Either input may be empty; the result is
    /// then an empty matrix rather than an error.
    pub fn build(keywords: &[String], reviews: &[String]) -> Self {
        let mut vocab: HashMap<&str, usize> = HashMap::new();
        for text in keywords.iter().chain(reviews.iter()) {
            for tok in tokens(text) {
                let next = vocab.len();
                vocab.entry(tok).or_insert(next);
            }
        }

        let count_vector = |text: &str| -> Vec<f64> {
            let mut v = vec![0.0; vocab.len()];
            for tok in tokens(text) {
                if let Some(&i) = vocab.get(tok) {
                    v[i] += 1.0;
                }
            }
            v
        };

        let keyword_vecs: Vec<Vec<f64>> = keywords.iter().map(|s| count_vector(s)).collect();
        let review_vecs: Vec<Vec<f64>> = reviews.iter().map(|s| count_vector(s)).collect();

        let mut scores = Vec::with_capacity(keywords.len() * reviews.len());
        for k in &keyword_vecs {
            for r in &review_vecs {
                scores.push(cosine(k, r));
            }
        }

        Self {
            keywords: keywords.len(),
            reviews: reviews.len(),
            scores,
        }
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords
    }

    pub fn review_count(&self) -> usize {
        self.reviews
    }

    /// Similarity for (keyword, review); always in [0, 1].
    pub fn score(&self, keyword: usize, review: usize) -> f64 {
        self.scores[keyword * self.reviews + review]
    }

    /// Indices (and scores) of reviews whose similarity to `keyword`
    /// strictly exceeds `threshold`, in review order. A tie at exactly the
    /// threshold is not a match.
    pub fn matches_for(&self, keyword: usize, threshold: f64) -> Vec<(usize, f64)> {
        (0..self.reviews)
            .filter_map(|r| {
                let s = self.score(keyword, r);
                (s > threshold).then_some((r, s))
            })
            .collect()
    }
}

/// Cosine similarity of two count vectors. Defined as 0.0 when either
/// vector is all zeros, so empty texts never divide by zero.
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shared_terms_match_and_disjoint_do_not() {
        let keywords = owned(&["aplikasi mudah"]);
        let reviews = owned(&[
            "aplikasi ini sangat mudah digunakan",
            "cuaca hari ini cerah",
        ]);
        let m = SimilarityMatrix::build(&keywords, &reviews);

        // "aplikasi" and "mudah" are shared with the first review.
        assert!(m.score(0, 0) > DEFAULT_THRESHOLD);
        // Disjoint vocabularies give exactly zero.
        assert_eq!(m.score(0, 1), 0.0);

        let hits = m.matches_for(0, DEFAULT_THRESHOLD);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn scores_are_bounded() {
        let keywords = owned(&["login akun", "pembayaran", "aplikasi mudah"]);
        let reviews = owned(&[
            "login login login akun saya gagal",
            "aplikasi mudah",
            "tidak ada hubungannya sama sekali",
        ]);
        let m = SimilarityMatrix::build(&keywords, &reviews);
        for k in 0..m.keyword_count() {
            for r in 0..m.review_count() {
                let s = m.score(k, r);
                assert!((0.0..=1.0 + 1e-12).contains(&s), "score {s} out of range");
            }
        }
        // Identical texts score 1.0.
        assert!((m.score(2, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_corpus_yields_empty_matrix() {
        let keywords = owned(&["aplikasi mudah"]);
        let m = SimilarityMatrix::build(&keywords, &[]);
        assert_eq!(m.review_count(), 0);
        assert!(m.matches_for(0, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn empty_normalized_review_is_a_zero_vector() {
        let keywords = owned(&["aplikasi mudah"]);
        let reviews = owned(&["", "aplikasi mudah"]);
        let m = SimilarityMatrix::build(&keywords, &reviews);
        assert_eq!(m.score(0, 0), 0.0);
        let hits = m.matches_for(0, DEFAULT_THRESHOLD);
        assert_eq!(hits, vec![(1, m.score(0, 1))]);
    }

    #[test]
    fn tie_at_threshold_is_not_a_match() {
        let keywords = owned(&["alpha beta"]);
        let reviews = owned(&["alpha gamma"]);
        let m = SimilarityMatrix::build(&keywords, &reviews);
        let s = m.score(0, 0);
        // Exactly at the score itself: strict inequality excludes it.
        assert!(m.matches_for(0, s).is_empty());
        assert_eq!(m.matches_for(0, s - 1e-9).len(), 1);
    }

    #[test]
    fn no_keywords_means_no_matches() {
        let m = SimilarityMatrix::build(&[], &owned(&["apa saja"]));
        assert_eq!(m.keyword_count(), 0);
    }
}
