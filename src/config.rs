// src/config.rs
//! Keyword table loading. The phrase list is per-run configuration passed
//! into the pipeline, never a process-wide constant.

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "KEYWORDS_CONFIG_PATH";

/// Load keyword phrases from an explicit path. Supports TOML
/// (`phrases = [...]`) or a JSON string array.
pub fn load_keywords_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading keywords from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_keywords(&content, ext.as_str())
}

/// Load keywords using env var + fallbacks:
/// 1) $KEYWORDS_CONFIG_PATH
/// 2) config/keywords.toml
/// 3) config/keywords.json
pub fn load_keywords_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_keywords_from(&pb);
        } else {
            return Err(anyhow!("KEYWORDS_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/keywords.toml");
    if toml_p.exists() {
        return load_keywords_from(&toml_p);
    }
    let json_p = PathBuf::from("config/keywords.json");
    if json_p.exists() {
        return load_keywords_from(&json_p);
    }
    Ok(Vec::new())
}

fn parse_keywords(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    let try_toml = hint_ext == "toml" || s.contains("phrases");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported keywords format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct KeywordsFile {
        phrases: Vec<String>,
    }
    let v: KeywordsFile = toml::from_str(s)?;
    Ok(clean_list(v.phrases))
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim entries, drop empties, drop later duplicates. Order is preserved:
/// the keyword ordinal is its group identity in the report.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() {
            continue;
        }
        if seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
    out
}
