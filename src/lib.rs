// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod playstore;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{KeywordResult, Report, ScoredMatch};
pub use crate::collector::{
    CancelFlag, CollectorConfig, FetchError, RawReview, Review, ReviewQuery, ReviewSource, Sort,
};
pub use crate::matcher::{SimilarityMatrix, DEFAULT_THRESHOLD};
pub use crate::pipeline::{analyze, AnalyzerConfig};
pub use crate::sentiment::{classify_rating, LexiconScorer, PolarityScorer};
