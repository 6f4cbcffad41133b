// src/sentiment.rs
//! Lexicon-based polarity scoring and the 1-5 rating scale.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

// Normalization constant: compound = sum / sqrt(sum^2 + ALPHA).
const ALPHA: f64 = 15.0;

/// Opaque polarity capability: text in, compound score in [-1, 1] out.
/// The pipeline only consumes this contract, so tests can inject a
/// deterministic fake.
pub trait PolarityScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Built-in lexicon/rule scorer over the embedded valence table
/// (Indonesian plus common English terms).
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for a word (0.0 if absent).
    #[inline]
    fn word_valence(w: &str) -> f64 {
        LEXICON.get(w).copied().unwrap_or(0.0)
    }
}

impl PolarityScorer for LexiconScorer {
    /// Sums lexicon valences over the tokens. Negation: a negator within
    /// the 3 preceding tokens flips the sign of a word's valence. The sum
    /// is squashed into [-1, 1].
    fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0;

        for i in 0..tokens.len() {
            let base = Self::word_valence(&tokens[i]);
            if base == 0.0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            sum += if negated { -base } else { base };
        }

        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "tidak"
            | "tak"
            | "bukan"
            | "jangan"
            | "belum"
            | "kurang"
            | "gak"
            | "ga"
            | "nggak"
            | "not"
            | "no"
            | "never"
            | "cannot"
            | "without"
    )
}

/// Map a compound polarity score in [-1, 1] onto the 1-5 rating scale.
///
/// Branches are evaluated in order and cover the whole interval:
/// `s <= -0.6 -> 1`, `-0.6 < s <= -0.2 -> 2`, `-0.2 < s < 0.2 -> 3`,
/// `0.2 <= s < 0.6 -> 4`, `s >= 0.6 -> 5`.
pub fn classify_rating(score: f64) -> u8 {
    if score <= -0.6 {
        1
    } else if score <= -0.2 {
        2
    } else if score < 0.2 {
        3
    } else if score < 0.6 {
        4
    } else {
        5
    }
}
