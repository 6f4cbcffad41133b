// src/pipeline.rs
//! End-to-end analysis run: collect -> normalize -> match -> score ->
//! aggregate. Single-threaded and sequential; every entity created here
//! lives only for the duration of one invocation.

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::{Report, ScoredMatch};
use crate::collector::{
    collect_reviews, CancelFlag, CollectorConfig, Review, ReviewQuery, ReviewSource, Sort,
};
use crate::matcher::{SimilarityMatrix, DEFAULT_THRESHOLD};
use crate::sentiment::{classify_rating, PolarityScorer};

/// Per-run analysis configuration. The keyword table is passed in here
/// explicitly rather than living as process-wide state.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub lang: String,
    pub country: String,
    pub sort: Sort,
    pub filter_score: Option<u8>,
    /// Strict lower bound on cosine similarity for a match.
    pub threshold: f64,
    pub collector: CollectorConfig,
    /// Keyword phrases in stable order; the ordinal is the group identity.
    pub keywords: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lang: "id".into(),
            country: "id".into(),
            sort: Sort::Newest,
            filter_score: None,
            threshold: DEFAULT_THRESHOLD,
            collector: CollectorConfig::default(),
            keywords: Vec::new(),
        }
    }
}

/// Run the full analysis for `app_id`.
///
/// An empty corpus is not an error: the run completes with zero matches
/// and an undefined overall score. A fetch failure aborts the whole run.
pub async fn analyze(
    app_id: &str,
    source: &dyn ReviewSource,
    scorer: &dyn PolarityScorer,
    cfg: &AnalyzerConfig,
    cancel: &CancelFlag,
) -> Result<Report> {
    let query = ReviewQuery {
        app_id: app_id.to_string(),
        lang: cfg.lang.clone(),
        country: cfg.country.clone(),
        sort: cfg.sort,
        count: cfg.collector.batch_size,
        filter_score: cfg.filter_score,
    };

    let raw = collect_reviews(source, &query, &cfg.collector, cancel)
        .await
        .context("collecting reviews")?;
    info!(app_id, reviews = raw.len(), "collected reviews");

    let reviews: Vec<Review> = raw.into_iter().map(Review::from_raw).collect();
    let texts: Vec<String> = reviews.iter().map(|r| r.normalized.clone()).collect();

    let matrix = SimilarityMatrix::build(&cfg.keywords, &texts);

    let mut groups = Vec::with_capacity(cfg.keywords.len());
    for (k, keyword) in cfg.keywords.iter().enumerate() {
        let mut matches = Vec::new();
        for (r, similarity) in matrix.matches_for(k, cfg.threshold) {
            // Polarity is recomputed per match on purpose; a review that
            // matches several keywords is scored once per keyword.
            let compound = scorer.compound(&texts[r]);
            let rating = classify_rating(compound);
            matches.push(ScoredMatch {
                review: texts[r].clone(),
                similarity,
                rating,
            });
        }
        if !matches.is_empty() {
            info!(keyword = %keyword, matches = matches.len(), "keyword group");
        }
        groups.push((keyword.clone(), matches));
    }

    let report = Report::from_groups(groups);
    info!(
        groups = report.keywords.len(),
        overall = ?report.overall,
        "analysis finished"
    );
    Ok(report)
}
