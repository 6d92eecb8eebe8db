use std::collections::HashMap;

use super::{distinct, sort_ranked, DocScore, RankingStrategy};
use crate::index::{DocId, Term};
use crate::store::FieldView;

/// Cosine similarity between log-tf/idf weighted query and document vectors.
///
/// The document norm only covers the query's terms, not the whole document
/// vector, so scores are not true cosines.
#[derive(Debug, Clone)]
pub struct TfIdfCosine {
    pub top_k: usize,
    /// Replaces the field's own corpus size when set
    pub corpus_size: Option<u64>,
}

impl Default for TfIdfCosine {
    fn default() -> Self {
        Self { top_k: 100, corpus_size: None }
    }
}

/// `log10((n + 1) / df)`, zero for unseen terms.
pub fn idf(corpus_size: u64, df: u32) -> f64 {
    if df == 0 {
        return 0.0;
    }
    ((corpus_size as f64 + 1.0) / df as f64).log10()
}

fn log_tf(tf: u32) -> f64 {
    1.0 + (tf as f64).log10()
}

impl RankingStrategy for TfIdfCosine {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn rank(&self, view: &FieldView<'_>, terms: &[Term]) -> Vec<DocScore> {
        let meta = view.meta();
        let n = self.corpus_size.unwrap_or(meta.corpus_size);

        let mut query_tf: HashMap<&Term, u32> = HashMap::new();
        for t in terms {
            *query_tf.entry(t).or_insert(0) += 1;
        }
        // (term, idf, query weight); non-discriminative terms never enter the norm
        let weighted: Vec<(&Term, f64, f64)> = distinct(terms)
            .into_iter()
            .filter_map(|t| {
                let idf = idf(n, meta.df(t.as_str()));
                (idf > 0.0).then(|| (t, idf, log_tf(query_tf[t]) * idf))
            })
            .collect();
        if weighted.is_empty() {
            return Vec::new();
        }
        let query_norm = weighted.iter().map(|(_, _, w)| w * w).sum::<f64>().sqrt();

        let mut dot: HashMap<DocId, f64> = HashMap::new();
        let mut norm_sq: HashMap<DocId, f64> = HashMap::new();
        for &(term, idf, qw) in &weighted {
            for p in view.postings(term).iter() {
                // a frequency truncated to zero carries no weight
                if p.tf == 0 {
                    continue;
                }
                let dw = log_tf(p.tf) * idf;
                *dot.entry(p.doc_id).or_insert(0.0) += dw * qw;
                *norm_sq.entry(p.doc_id).or_insert(0.0) += dw * dw;
            }
        }

        let mut scores: Vec<DocScore> = dot
            .into_iter()
            .filter_map(|(doc_id, d)| {
                let dn = norm_sq.get(&doc_id).copied().unwrap_or(0.0).sqrt();
                if dn == 0.0 || query_norm == 0.0 {
                    return None;
                }
                Some(DocScore { doc_id, score: d / (dn * query_norm) })
            })
            .collect();
        tracing::debug!(terms = weighted.len(), candidates = scores.len(), "tf-idf scored");
        sort_ranked(&mut scores);
        scores.truncate(self.top_k);
        scores
    }
}
