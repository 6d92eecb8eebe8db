//! Ranking strategies over a single field.
//!
//! Every strategy consumes the same inputs, a [`FieldView`] and the tokenized
//! query, and produces documents ordered best first. Callers pick one per
//! query; see [`BodyRanking`] for the body-field choice.

pub mod bm25;
pub mod structural;
pub mod tfidf;

pub use bm25::Bm25;
pub use structural::{AnchorFrequency, TitleMatch};
pub use tfidf::TfIdfCosine;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::index::{DocId, Term};
use crate::store::FieldView;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocScore {
    pub doc_id: DocId,
    pub score: f64,
}

pub trait RankingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn rank(&self, view: &FieldView<'_>, terms: &[Term]) -> Vec<DocScore>;
}

/// Strategy used for the body field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyRanking {
    #[default]
    TfIdf,
    Bm25,
}

/// Descending by score, ascending by document id on ties.
pub(crate) fn sort_ranked(scores: &mut [DocScore]) {
    scores.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.doc_id.cmp(&b.doc_id),
        ord => ord,
    });
}

/// Distinct terms in first-occurrence order.
pub(crate) fn distinct(terms: &[Term]) -> Vec<&Term> {
    let mut seen = HashSet::new();
    terms.iter().filter(|t| seen.insert(*t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_breaks_ties_by_doc_id() {
        let mut v = vec![
            DocScore { doc_id: 9, score: 1.0 },
            DocScore { doc_id: 2, score: 3.0 },
            DocScore { doc_id: 4, score: 1.0 },
        ];
        sort_ranked(&mut v);
        let ids: Vec<DocId> = v.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![2, 4, 9]);
    }

    #[test]
    fn distinct_keeps_first_occurrence() {
        let terms: Vec<Term> = ["b", "a", "b", "c", "a"].iter().filter_map(|t| Term::new(t)).collect();
        let d: Vec<&str> = distinct(&terms).into_iter().map(Term::as_str).collect();
        assert_eq!(d, vec!["b", "a", "c"]);
    }
}
