// src/collector.rs
//! Batched, paginated review collection with a fixed batch ceiling.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::normalize::normalize;

/// Review sort order understood by the store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Sort {
    MostRelevant,
    #[default]
    Newest,
    Rating,
}

/// A review as delivered by the source, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawReview {
    pub id: String,
    pub content: String,
}

/// A collected review plus its normalized text. The normalized field is
/// computed once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: String,
    pub content: String,
    pub normalized: String,
}

impl Review {
    pub fn from_raw(raw: RawReview) -> Self {
        let normalized = normalize(&raw.content);
        Self {
            id: raw.id,
            content: raw.content,
            normalized,
        }
    }
}

/// Fatal source failures. A failed batch aborts the whole run; there are
/// no retries and no partial results for fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("review source unreachable: {0}")]
    Transport(String),
    #[error("malformed review batch: {0}")]
    Malformed(String),
}

/// One page of reviews plus the continuation token. `None` means the
/// source is exhausted.
pub type Batch = (Vec<RawReview>, Option<String>);

/// Immutable per-run query parameters passed to the source on every batch.
#[derive(Debug, Clone)]
pub struct ReviewQuery {
    pub app_id: String,
    pub lang: String,
    pub country: String,
    pub sort: Sort,
    pub count: usize,
    pub filter_score: Option<u8>,
}

/// The collector's only outbound dependency: a black-box paginated source.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch one batch. `token` is the continuation token returned by the
    /// previous call, `None` for the first page.
    async fn fetch_batch(&self, query: &ReviewQuery, token: Option<&str>)
        -> Result<Batch, FetchError>;

    fn name(&self) -> &'static str;
}

/// Cooperative cancellation, checked between batches. Network calls can be
/// slow, so a caller may flip this from another task.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Reviews requested per fetch call.
    pub batch_size: usize,
    /// Hard ceiling on fetch calls per run.
    pub max_batches: usize,
    /// Pause between successive fetches, for the source's rate limits.
    pub batch_delay: Duration,
    /// Drop reviews whose id was already seen in an earlier batch. Off by
    /// default: the original pipeline tracked seen ids but never filtered,
    /// so overlapping pages are double-counted unless this is enabled.
    pub dedupe: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_batches: 9,
            batch_delay: Duration::from_secs(1),
            dedupe: false,
        }
    }
}

/// Collect up to `cfg.max_batches` batches of reviews for `query.app_id`.
///
/// Stops early when the source reports exhaustion (no continuation token)
/// or when `cancel` is set; cancellation returns what was gathered so far.
pub async fn collect_reviews(
    source: &dyn ReviewSource,
    query: &ReviewQuery,
    cfg: &CollectorConfig,
    cancel: &CancelFlag,
) -> Result<Vec<RawReview>, FetchError> {
    let mut collected: Vec<RawReview> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut token: Option<String> = None;

    for batch_no in 0..cfg.max_batches {
        if cancel.is_cancelled() {
            info!(
                batch = batch_no,
                collected = collected.len(),
                "collection cancelled"
            );
            break;
        }

        let (batch, next) = source.fetch_batch(query, token.as_deref()).await?;
        debug!(
            batch = batch_no,
            size = batch.len(),
            source = source.name(),
            "fetched review batch"
        );

        for raw in batch {
            let fresh = seen_ids.insert(raw.id.clone());
            if cfg.dedupe && !fresh {
                continue;
            }
            collected.push(raw);
        }

        match next {
            Some(t) => token = Some(t),
            None => break, // no more pages
        }

        if batch_no + 1 < cfg.max_batches {
            tokio::time::sleep(cfg.batch_delay).await;
        }
    }

    info!(
        reviews = collected.len(),
        unique = seen_ids.len(),
        "review collection finished"
    );
    Ok(collected)
}
