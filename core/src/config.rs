//! Search configuration.
//!
//! Every setting has a default, so an empty JSON object (or no file at all)
//! yields the stock behaviour.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};
use crate::ranking::BodyRanking;
use crate::store::DEFAULT_CACHE_TERMS;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub fusion: FusionConfig,

    #[serde(default)]
    pub bm25: Bm25Params,

    /// Results kept by TF-IDF body ranking
    #[serde(default = "default_top_k")]
    pub body_top_k: usize,

    #[serde(default)]
    pub body_ranking: BodyRanking,

    /// Overrides the body field's corpus size for idf
    #[serde(default)]
    pub corpus_size: Option<u64>,

    #[serde(default = "default_true")]
    pub cache_postings: bool,

    /// Posting lists kept per field once caching is on
    #[serde(default = "default_cache_terms")]
    pub cache_terms: usize,

    /// Newline-delimited stopword file; the built-in English list when unset
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,

    #[serde(default)]
    pub resources: ResourcePaths,
}

/// Weights for combining BM25, title overlap and authority.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FusionConfig {
    #[serde(default = "default_bm25_weight")]
    pub bm25_weight: f64,

    #[serde(default = "default_title_weight")]
    pub title_weight: f64,

    #[serde(default = "default_authority_weight")]
    pub authority_weight: f64,

    /// Multiplier bringing raw authority values to the range of the other signals
    #[serde(default = "default_authority_scale")]
    pub authority_scale: f64,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Bm25Params {
    #[serde(default = "default_k1")]
    pub k1: f64,

    #[serde(default = "default_b")]
    pub b: f64,
}

/// Optional lookup tables, relative to the index root.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourcePaths {
    /// Title blobs, merged in order (later files win)
    #[serde(default = "default_titles")]
    pub titles: Vec<String>,

    #[serde(default = "default_pagerank")]
    pub pagerank: String,

    /// Gzip CSV fallback used when the pagerank blob is missing
    #[serde(default = "default_pagerank_csv")]
    pub pagerank_csv_gz: String,

    #[serde(default = "default_pageviews")]
    pub pageviews: String,
}

fn default_top_k() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_cache_terms() -> usize {
    DEFAULT_CACHE_TERMS
}

fn default_bm25_weight() -> f64 {
    0.5
}

fn default_title_weight() -> f64 {
    0.4
}

fn default_authority_weight() -> f64 {
    0.1
}

fn default_authority_scale() -> f64 {
    100_000.0
}

fn default_k1() -> f64 {
    1.5
}

fn default_b() -> f64 {
    0.75
}

fn default_titles() -> Vec<String> {
    vec!["id_title/id_title.bin".to_string()]
}

fn default_pagerank() -> String {
    "pr/pagerank.bin".to_string()
}

fn default_pagerank_csv() -> String {
    "pr/pagerank.csv.gz".to_string()
}

fn default_pageviews() -> String {
    "pv/pageviews.bin".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fusion: FusionConfig::default(),
            bm25: Bm25Params::default(),
            body_top_k: default_top_k(),
            body_ranking: BodyRanking::default(),
            corpus_size: None,
            cache_postings: true,
            cache_terms: default_cache_terms(),
            stopwords_path: None,
            resources: ResourcePaths::default(),
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            bm25_weight: default_bm25_weight(),
            title_weight: default_title_weight(),
            authority_weight: default_authority_weight(),
            authority_scale: default_authority_scale(),
            top_k: default_top_k(),
        }
    }
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: default_k1(), b: default_b() }
    }
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            titles: default_titles(),
            pagerank: default_pagerank(),
            pagerank_csv_gz: default_pagerank_csv(),
            pageviews: default_pageviews(),
        }
    }
}

impl SearchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| SearchError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| SearchError::Config { path: path.to_path_buf(), source })
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
