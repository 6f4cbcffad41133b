// tests/collector_batching.rs
// Batch ceiling, continuation-token exhaustion, dedupe flag, cancellation,
// and fetch-error propagation in the review collector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use app_review_analyzer::collector::{
    collect_reviews, Batch, CancelFlag, CollectorConfig, FetchError, RawReview, ReviewQuery,
    ReviewSource, Sort,
};

fn query() -> ReviewQuery {
    ReviewQuery {
        app_id: "id.example.app".into(),
        lang: "id".into(),
        country: "id".into(),
        sort: Sort::Newest,
        count: 100,
        filter_score: None,
    }
}

fn fast() -> CollectorConfig {
    CollectorConfig {
        batch_delay: Duration::ZERO,
        ..CollectorConfig::default()
    }
}

fn review(id: &str) -> RawReview {
    RawReview {
        id: id.into(),
        content: format!("isi ulasan {id}"),
    }
}

/// Scripted source: one entry per page; `None` continuation after the last
/// scripted page unless `endless` is set.
struct ScriptedSource {
    pages: Vec<Vec<RawReview>>,
    endless: bool,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(pages: Vec<Vec<RawReview>>) -> Self {
        Self {
            pages,
            endless: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn endless(pages: Vec<Vec<RawReview>>) -> Self {
        Self {
            pages,
            endless: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewSource for ScriptedSource {
    async fn fetch_batch(
        &self,
        _query: &ReviewQuery,
        token: Option<&str>,
    ) -> Result<Batch, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);

        // The collector must hand back the token we produced last time.
        if n == 0 {
            assert!(token.is_none(), "first page must have no token");
        } else {
            assert_eq!(token, Some(format!("page-{n}").as_str()));
        }

        let page = self
            .pages
            .get(n % self.pages.len().max(1))
            .cloned()
            .unwrap_or_default();
        let next = if self.endless || n + 1 < self.pages.len() {
            Some(format!("page-{}", n + 1))
        } else {
            None
        };
        Ok((page, next))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct FailingSource;

#[async_trait]
impl ReviewSource for FailingSource {
    async fn fetch_batch(
        &self,
        _query: &ReviewQuery,
        _token: Option<&str>,
    ) -> Result<Batch, FetchError> {
        Err(FetchError::Transport("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn stops_after_two_batches_when_token_runs_out() {
    let source = ScriptedSource::new(vec![
        vec![review("a1"), review("a2")],
        vec![review("b1")],
    ]);
    let got = collect_reviews(&source, &query(), &fast(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(source.calls(), 2, "must stop on missing token, not ceiling");
    assert_eq!(got.len(), 3);
}

#[tokio::test]
async fn batch_ceiling_is_enforced_for_endless_sources() {
    let source = ScriptedSource::endless(vec![vec![review("x")]]);
    let got = collect_reviews(&source, &query(), &fast(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(source.calls(), 9);
    assert_eq!(got.len(), 9);
}

#[tokio::test]
async fn duplicates_pass_through_by_default() {
    // Overlapping pages: "dup" appears in both.
    let source = ScriptedSource::new(vec![
        vec![review("dup"), review("a")],
        vec![review("dup"), review("b")],
    ]);
    let got = collect_reviews(&source, &query(), &fast(), &CancelFlag::new())
        .await
        .unwrap();

    // Ids are tracked but not filtered: 4 reviews, 3 unique.
    assert_eq!(got.len(), 4);
}

#[tokio::test]
async fn dedupe_flag_filters_repeated_ids() {
    let source = ScriptedSource::new(vec![
        vec![review("dup"), review("a")],
        vec![review("dup"), review("b")],
    ]);
    let cfg = CollectorConfig {
        dedupe: true,
        ..fast()
    };
    let got = collect_reviews(&source, &query(), &cfg, &CancelFlag::new())
        .await
        .unwrap();

    let ids: Vec<&str> = got.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["dup", "a", "b"]);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_fetch() {
    let source = ScriptedSource::endless(vec![vec![review("x")]]);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let got = collect_reviews(&source, &query(), &fast(), &cancel)
        .await
        .unwrap();
    assert_eq!(source.calls(), 0, "cancelled run must not fetch");
    assert!(got.is_empty());
}

#[tokio::test]
async fn fetch_failure_aborts_the_run() {
    let err = collect_reviews(&FailingSource, &query(), &fast(), &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
