use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

pub type DocId = u32;

/// A normalized query or index token. Always lower-case and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(String);

impl Term {
    /// Lower-cases `raw`; returns `None` for empty or whitespace-only input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Term(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Term {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Term {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Indexed zone of a document; each has independent postings and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Body,
    Title,
    Anchor,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Body, Field::Title, Field::Anchor];

    /// Directory name of the field under the index root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Field::Body => "body",
            Field::Title => "title",
            Field::Anchor => "anchor",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

impl Posting {
    pub fn new(doc_id: DocId, tf: u32) -> Self {
        Self { doc_id, tf }
    }
}

/// Where (part of) a term's posting list starts: a segment file name relative
/// to the field directory and a byte offset into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLocation {
    pub segment: String,
    pub offset: u64,
}

/// Per-field statistics consulted by every scoring formula.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub document_frequency: HashMap<Term, u32>,
    pub term_total: HashMap<Term, u64>,
    pub posting_locations: HashMap<Term, Vec<PostingLocation>>,
    pub document_lengths: HashMap<DocId, u32>,
    pub average_document_length: f64,
    /// Zero means "derive from `document_lengths`".
    #[serde(default)]
    pub corpus_size: u64,
}

impl IndexMetadata {
    /// Fills in derived statistics after deserialization: corpus size from the
    /// length table (at least 1), and the average length when it was not stored.
    pub fn normalized(mut self) -> Self {
        if self.corpus_size == 0 {
            self.corpus_size = self.document_lengths.len() as u64;
        }
        self.corpus_size = self.corpus_size.max(1);
        if !(self.average_document_length > 0.0) && !self.document_lengths.is_empty() {
            let total: u64 = self.document_lengths.values().map(|&l| l as u64).sum();
            self.average_document_length = total as f64 / self.document_lengths.len() as f64;
        }
        self
    }

    pub fn df(&self, term: &str) -> u32 {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    pub fn locations(&self, term: &str) -> &[PostingLocation] {
        self.posting_locations
            .get(term)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Field length of `doc`, falling back to the corpus average.
    pub fn document_length(&self, doc: DocId) -> f64 {
        self.document_lengths
            .get(&doc)
            .map(|&l| l as f64)
            .unwrap_or(self.average_document_length)
    }

    pub fn num_terms(&self) -> usize {
        self.document_frequency.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_is_lowercased_and_never_empty() {
        assert_eq!(Term::new("Rust").unwrap().as_str(), "rust");
        assert!(Term::new("").is_none());
        assert!(Term::new("   ").is_none());
        assert_eq!(Term::new("Rust"), Term::new("RUST"));
    }

    #[test]
    fn normalized_derives_missing_statistics() {
        let mut meta = IndexMetadata::default();
        meta.document_lengths.insert(1, 10);
        meta.document_lengths.insert(2, 30);
        let meta = meta.normalized();
        assert_eq!(meta.corpus_size, 2);
        assert!((meta.average_document_length - 20.0).abs() < 1e-9);
        assert!((meta.document_length(7) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_metadata_has_corpus_of_one() {
        let meta = IndexMetadata::default().normalized();
        assert_eq!(meta.corpus_size, 1);
        assert_eq!(meta.df("missing"), 0);
        assert!(meta.locations("missing").is_empty());
    }
}
