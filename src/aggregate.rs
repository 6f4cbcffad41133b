// src/aggregate.rs
//! Grouping matched reviews by keyword and averaging ratings.

use serde::{Deserialize, Serialize};

/// One review matched to a keyword: its normalized text, the cosine
/// similarity that qualified it, and the 1-5 sentiment rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub review: String,
    pub similarity: f64,
    pub rating: u8,
}

/// All matches for one keyword, in review order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub keyword: String,
    pub matches: Vec<ScoredMatch>,
    pub average_rating: f64,
}

/// Final report: per-keyword results in original keyword order plus the
/// flattened overall average. `overall` is `None` when nothing matched
/// anywhere; callers must render that distinctly from a numeric zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    pub keywords: Vec<KeywordResult>,
    pub overall: Option<f64>,
}

impl Report {
    /// Build a report from per-keyword match groups. Groups with no
    /// matches are dropped entirely rather than reported with an empty
    /// average. A review matching several keywords contributes one rating
    /// per keyword to the overall mean.
    pub fn from_groups(groups: Vec<(String, Vec<ScoredMatch>)>) -> Self {
        let mut keywords = Vec::new();
        let mut rating_total = 0u64;
        let mut rating_count = 0usize;

        for (keyword, matches) in groups {
            if matches.is_empty() {
                continue;
            }
            let sum: u64 = matches.iter().map(|m| u64::from(m.rating)).sum();
            rating_total += sum;
            rating_count += matches.len();
            let average_rating = sum as f64 / matches.len() as f64;
            keywords.push(KeywordResult {
                keyword,
                matches,
                average_rating,
            });
        }

        let overall = (rating_count > 0).then(|| rating_total as f64 / rating_count as f64);
        Report { keywords, overall }
    }

    /// The summary line shown by the front end.
    pub fn summary_line(&self) -> String {
        match self.overall {
            Some(v) => format!("Services Domain Score: {v:.2}"),
            None => "Services Domain Score: n/a".to_string(),
        }
    }
}
