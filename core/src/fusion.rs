//! Combines BM25, title overlap and static authority into one ranking.
//!
//! final = w_bm25 · bm25 / max(bm25)
//!       + w_title · overlap(query, title)
//!       + w_auth · authority · scale

use std::collections::HashMap;

use crate::config::FusionConfig;
use crate::index::{DocId, Term};
use crate::ranking::{distinct, sort_ranked, DocScore};
use crate::tables::{AuthorityTable, TitleTable};

/// Distinct query tokens found as substrings of the lower-cased title, over
/// the number of query tokens including repeats.
pub fn title_overlap(query: &[Term], title: &str) -> f64 {
    overlap(&distinct(query), query.len(), title)
}

fn overlap(distinct_terms: &[&Term], total: usize, title: &str) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let title = title.to_lowercase();
    let hits = distinct_terms.iter().filter(|t| title.contains(t.as_str())).count();
    hits as f64 / total as f64
}

/// Ranks the documents of `bm25` by fused score, best first, keeping
/// `cfg.top_k`. Documents without a stored title get no title overlap.
pub fn fuse(
    bm25: &HashMap<DocId, f64>,
    query: &[Term],
    titles: &TitleTable,
    authority: &AuthorityTable,
    cfg: &FusionConfig,
) -> Vec<DocScore> {
    if bm25.is_empty() {
        return Vec::new();
    }
    let max = bm25.values().copied().fold(0.0_f64, f64::max);
    let divisor = if max > 0.0 { max } else { 1.0 };
    let unique = distinct(query);

    let mut fused: Vec<DocScore> = bm25
        .iter()
        .map(|(&doc_id, &score)| {
            let title_score = titles.get(doc_id).map(|t| overlap(&unique, query.len(), t)).unwrap_or(0.0);
            let auth = authority.rank(doc_id) * cfg.authority_scale;
            let score = cfg.bm25_weight * (score / divisor) + cfg.title_weight * title_score + cfg.authority_weight * auth;
            DocScore { doc_id, score }
        })
        .collect();
    sort_ranked(&mut fused);
    fused.truncate(cfg.top_k);
    fused
}
