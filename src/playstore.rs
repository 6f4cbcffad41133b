// src/playstore.rs
//! Google Play `batchexecute` review source.
//!
//! The reviews RPC returns an anti-JSON envelope followed by a nested JSON
//! frame whose third element is itself a JSON string: an array of review
//! records plus the continuation token for the next page.

use async_trait::async_trait;
use serde_json::Value;

use crate::collector::{Batch, FetchError, RawReview, ReviewQuery, ReviewSource, Sort};

const BATCHEXECUTE_URL: &str = "https://play.google.com/_/PlayStoreUi/data/batchexecute";
const REVIEWS_RPC_ID: &str = "UsvDTd";

fn sort_code(sort: Sort) -> u8 {
    match sort {
        Sort::MostRelevant => 1,
        Sort::Newest => 2,
        Sort::Rating => 3,
    }
}

pub struct PlayStoreSource {
    client: reqwest::Client,
}

impl Default for PlayStoreSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayStoreSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build the `f.req` form value for one reviews RPC. The first page
    /// omits the continuation-token triple.
    fn freq(query: &ReviewQuery, token: Option<&str>) -> String {
        let sort = sort_code(query.sort);
        let count = query.count;
        let score = match query.filter_score {
            Some(s) => s.to_string(),
            None => "null".to_string(),
        };
        let app = &query.app_id;

        let inner = match token {
            Some(t) => format!(
                "[null,null,[2,{sort},[{count},null,{t:?}],null,[null,{score},null]],[{app:?},7]]"
            ),
            None => {
                format!("[null,null,[2,{sort},[{count}],null,[null,{score},null]],[{app:?},7]]")
            }
        };
        // The RPC body is carried as a JSON string inside the envelope.
        let escaped = serde_json::to_string(&inner).expect("escaping rpc body");
        format!("[[[{REVIEWS_RPC_ID:?},{escaped},null,\"generic\"]]]")
    }

    fn parse_response(body: &str) -> Result<Batch, FetchError> {
        let json_part = body.trim_start().trim_start_matches(")]}'").trim_start();
        let outer: Value = serde_json::from_str(json_part)
            .map_err(|e| FetchError::Malformed(format!("response envelope: {e}")))?;

        let payload_str = outer
            .get(0)
            .and_then(|frame| frame.get(2))
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::Malformed("missing rpc payload".into()))?;
        let payload: Value = serde_json::from_str(payload_str)
            .map_err(|e| FetchError::Malformed(format!("rpc payload: {e}")))?;

        let mut reviews = Vec::new();
        if let Some(items) = payload.get(0).and_then(Value::as_array) {
            for item in items {
                let id = item
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| FetchError::Malformed("review record without id".into()))?;
                // Review text may be null for rating-only entries.
                let content = item.get(4).and_then(Value::as_str).unwrap_or_default();
                reviews.push(RawReview {
                    id: id.to_string(),
                    content: content.to_string(),
                });
            }
        }

        let token = payload
            .get(1)
            .and_then(|pagination| pagination.get(1))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok((reviews, token))
    }
}

#[async_trait]
impl ReviewSource for PlayStoreSource {
    async fn fetch_batch(
        &self,
        query: &ReviewQuery,
        token: Option<&str>,
    ) -> Result<Batch, FetchError> {
        let url = format!(
            "{BATCHEXECUTE_URL}?hl={}&gl={}",
            query.lang, query.country
        );
        let body = self
            .client
            .post(&url)
            .form(&[("f.req", Self::freq(query, token))])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Self::parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "play-store"
    }
}
