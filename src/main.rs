//! Review Analyzer — Binary Entrypoint
//! Thin front end: scrape the store, run the pipeline, print the report.

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app_review_analyzer::collector::CancelFlag;
use app_review_analyzer::config::load_keywords_default;
use app_review_analyzer::pipeline::{analyze, AnalyzerConfig};
use app_review_analyzer::playstore::PlayStoreSource;
use app_review_analyzer::sentiment::LexiconScorer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere. Enables KEYWORDS_CONFIG_PATH
    // from .env so config.rs can pick it up.
    let _ = dotenvy::dotenv();
    init_tracing();

    let Some(app_id) = std::env::args().nth(1) else {
        bail!("usage: app-review-analyzer <app-id>");
    };

    let keywords = load_keywords_default().context("loading keyword table")?;
    if keywords.is_empty() {
        bail!("keyword table is empty; provide config/keywords.toml or KEYWORDS_CONFIG_PATH");
    }

    let cfg = AnalyzerConfig {
        keywords,
        ..Default::default()
    };
    let source = PlayStoreSource::new();
    let scorer = LexiconScorer::new();
    let cancel = CancelFlag::new();

    let report = analyze(&app_id, &source, &scorer, &cfg, &cancel).await?;

    for kr in &report.keywords {
        println!(
            "{}: {:.2} ({} matched reviews)",
            kr.keyword,
            kr.average_rating,
            kr.matches.len()
        );
    }
    println!("{}", report.summary_line());
    Ok(())
}
