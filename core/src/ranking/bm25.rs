use std::collections::HashMap;

use super::{sort_ranked, DocScore, RankingStrategy};
use crate::config::Bm25Params;
use crate::index::{DocId, Term};
use crate::store::FieldView;

/// Okapi BM25.
///
/// score(d) = Σ idf(t) · tf·(k1+1) / (tf + k1·(1 − b + b·|d|/avgdl))
/// idf(t)   = ln(1 + (N − df + 0.5) / (df + 0.5))
#[derive(Debug, Clone, Copy)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        Bm25Params::default().into()
    }
}

impl From<Bm25Params> for Bm25 {
    fn from(p: Bm25Params) -> Self {
        Self { k1: p.k1, b: p.b }
    }
}

pub fn idf(corpus_size: u64, df: u32) -> f64 {
    let (n, df) = (corpus_size as f64, df as f64);
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

impl Bm25 {
    /// Unsorted, untruncated score per matching document. Each query token
    /// contributes once per occurrence in `terms`.
    pub fn scores(&self, view: &FieldView<'_>, terms: &[Term]) -> HashMap<DocId, f64> {
        let meta = view.meta();
        let avgdl = if meta.average_document_length > 0.0 { meta.average_document_length } else { 1.0 };
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for term in terms {
            let df = meta.df(term.as_str());
            if df == 0 {
                continue;
            }
            let idf = idf(meta.corpus_size, df);
            for p in view.postings(term).iter() {
                let tf = p.tf as f64;
                let mut dl = meta.document_length(p.doc_id);
                if dl <= 0.0 {
                    dl = avgdl;
                }
                let norm = tf + self.k1 * (1.0 - self.b + self.b * dl / avgdl);
                *scores.entry(p.doc_id).or_insert(0.0) += idf * tf * (self.k1 + 1.0) / norm;
            }
        }
        tracing::debug!(candidates = scores.len(), "bm25 scored");
        scores
    }
}

impl RankingStrategy for Bm25 {
    fn name(&self) -> &'static str {
        "bm25"
    }

    fn rank(&self, view: &FieldView<'_>, terms: &[Term]) -> Vec<DocScore> {
        let mut ranked: Vec<DocScore> = self
            .scores(view, terms)
            .into_iter()
            .map(|(doc_id, score)| DocScore { doc_id, score })
            .collect();
        sort_ranked(&mut ranked);
        ranked
    }
}
