use std::collections::HashMap;

use super::{distinct, sort_ranked, DocScore, RankingStrategy};
use crate::index::{DocId, Posting, Term};
use crate::store::FieldView;

/// Counts distinct query terms present in each document. Returns every
/// matching document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleMatch;

/// Sums the raw frequency of each distinct query term per document. Returns
/// every matching document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorFrequency;

fn accumulate(view: &FieldView<'_>, terms: &[Term], weight: impl Fn(&Posting) -> u64) -> Vec<DocScore> {
    let mut counts: HashMap<DocId, u64> = HashMap::new();
    for term in distinct(terms) {
        if !view.meta().contains(term.as_str()) {
            continue;
        }
        for p in view.postings(term).iter() {
            *counts.entry(p.doc_id).or_insert(0) += weight(p);
        }
    }
    let mut ranked: Vec<DocScore> = counts
        .into_iter()
        .map(|(doc_id, c)| DocScore { doc_id, score: c as f64 })
        .collect();
    sort_ranked(&mut ranked);
    ranked
}

impl RankingStrategy for TitleMatch {
    fn name(&self) -> &'static str {
        "title"
    }

    fn rank(&self, view: &FieldView<'_>, terms: &[Term]) -> Vec<DocScore> {
        accumulate(view, terms, |_| 1)
    }
}

impl RankingStrategy for AnchorFrequency {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn rank(&self, view: &FieldView<'_>, terms: &[Term]) -> Vec<DocScore> {
        accumulate(view, terms, |p| p.tf as u64)
    }
}
