//! Static per-document lookup tables: display titles and authority signals.
//! All of them are optional; absence degrades to empty tables.

use std::collections::HashMap;

use crate::config::ResourcePaths;
use crate::error::Result;
use crate::index::DocId;
use crate::persist::{load_optional_blob, load_optional_gz_table, IndexPaths};

/// Parses an id as received from callers; `None` when it is not a
/// non-negative integer.
pub fn parse_doc_id(raw: &str) -> Option<DocId> {
    raw.trim().parse::<DocId>().ok()
}

#[derive(Debug, Clone, Default)]
pub struct TitleTable {
    titles: HashMap<DocId, String>,
}

impl TitleTable {
    pub fn new(titles: HashMap<DocId, String>) -> Self {
        Self { titles }
    }

    pub fn get(&self, doc_id: DocId) -> Option<&str> {
        self.titles.get(&doc_id).map(String::as_str)
    }

    /// The stored title, or `doc_<id>` when there is none.
    pub fn resolve(&self, doc_id: DocId) -> String {
        match self.get(doc_id) {
            Some(t) => t.to_string(),
            None => format!("doc_{doc_id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Merges every listed blob in order. Missing files are skipped; unreadable
    /// ones are logged and skipped.
    pub fn load(paths: &IndexPaths, files: &[String]) -> Self {
        let mut titles = HashMap::new();
        for rel in files {
            let path = paths.resource(rel);
            match load_optional_blob::<HashMap<DocId, String>>(&path) {
                Ok(Some(part)) => titles.extend(part),
                Ok(None) => tracing::debug!(path = %path.display(), "title table not present"),
                Err(err) => tracing::warn!(%err, "skipping unreadable title table"),
            }
        }
        tracing::info!(titles = titles.len(), "loaded titles");
        Self { titles }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorityTable {
    rank: HashMap<DocId, f64>,
    views: HashMap<DocId, u64>,
}

impl AuthorityTable {
    pub fn new(rank: HashMap<DocId, f64>, views: HashMap<DocId, u64>) -> Self {
        Self { rank, views }
    }

    pub fn rank(&self, doc_id: DocId) -> f64 {
        self.rank.get(&doc_id).copied().unwrap_or(0.0)
    }

    pub fn views(&self, doc_id: DocId) -> u64 {
        self.views.get(&doc_id).copied().unwrap_or(0)
    }

    /// Rank per raw id, aligned by position; unparsable ids get 0.0.
    pub fn rank_batch<S: AsRef<str>>(&self, ids: &[S]) -> Vec<f64> {
        ids.iter()
            .map(|id| parse_doc_id(id.as_ref()).map(|d| self.rank(d)).unwrap_or(0.0))
            .collect()
    }

    /// Views per raw id, aligned by position; unparsable ids get 0.
    pub fn views_batch<S: AsRef<str>>(&self, ids: &[S]) -> Vec<u64> {
        ids.iter()
            .map(|id| parse_doc_id(id.as_ref()).map(|d| self.views(d)).unwrap_or(0))
            .collect()
    }

    /// Pagerank comes from the blob, falling back to the gzip CSV when the
    /// blob is missing. Any failure leaves that part of the table empty.
    pub fn load(paths: &IndexPaths, res: &ResourcePaths) -> Self {
        let rank = or_empty("pagerank", load_rank(paths, res));
        let views = or_empty(
            "pageviews",
            load_optional_blob::<HashMap<DocId, u64>>(&paths.resource(&res.pageviews)),
        );
        tracing::info!(pagerank = rank.len(), pageviews = views.len(), "loaded authority tables");
        Self { rank, views }
    }
}

fn load_rank(paths: &IndexPaths, res: &ResourcePaths) -> Result<Option<HashMap<DocId, f64>>> {
    match load_optional_blob::<HashMap<DocId, f64>>(&paths.resource(&res.pagerank))? {
        Some(rank) => Ok(Some(rank)),
        None => load_optional_gz_table(&paths.resource(&res.pagerank_csv_gz)),
    }
}

fn or_empty<V>(what: &str, loaded: Result<Option<HashMap<DocId, V>>>) -> HashMap<DocId, V> {
    match loaded {
        Ok(Some(table)) => table,
        Ok(None) => {
            tracing::info!(table = what, "not present, using empty table");
            HashMap::new()
        }
        Err(err) => {
            tracing::warn!(table = what, %err, "unreadable, using empty table");
            HashMap::new()
        }
    }
}
