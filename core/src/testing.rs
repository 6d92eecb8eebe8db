//! Snapshot builders shared by unit tests, integration tests and benches.
//!
//! These write real on-disk snapshots (metadata, segments, lookup tables) so
//! that every test goes through the same loading path as production.

#![doc(hidden)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::codec::{SegmentWriter, DEFAULT_SEGMENT_BYTES};
use crate::config::ResourcePaths;
use crate::error::Result;
use crate::index::{DocId, Field, IndexMetadata, Posting, Term};
use crate::persist::{save_blob, save_metadata, IndexPaths};
use crate::tokenizer::Tokenizer;

/// Postings and document lengths for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldFixture {
    postings: BTreeMap<Term, Vec<Posting>>,
    lengths: HashMap<DocId, u32>,
}

impl FieldFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posting(mut self, term: &str, doc_id: DocId, tf: u32) -> Self {
        let term = Term::new(term).expect("fixture term");
        self.postings.entry(term).or_default().push(Posting::new(doc_id, tf));
        self
    }

    pub fn length(mut self, doc_id: DocId, len: u32) -> Self {
        self.lengths.insert(doc_id, len);
        self
    }

    /// Tokenizes each document and records term frequencies and lengths.
    pub fn from_texts(tokenizer: &Tokenizer, docs: &[(DocId, &str)]) -> Self {
        let mut fixture = Self::new();
        for &(doc_id, text) in docs {
            let terms = tokenizer.tokenize(text);
            fixture.lengths.insert(doc_id, terms.len() as u32);
            let mut counts: BTreeMap<Term, u32> = BTreeMap::new();
            for term in terms {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, tf) in counts {
                fixture.postings.entry(term).or_default().push(Posting::new(doc_id, tf));
            }
        }
        fixture
    }

    /// Writes segments and metadata for `field` and returns the metadata as
    /// stored.
    pub fn write(&self, paths: &IndexPaths, field: Field, segment_bytes: u64) -> Result<IndexMetadata> {
        let dir = paths.field_dir(field);
        std::fs::create_dir_all(&dir).map_err(|e| crate::error::SearchError::io(&dir, e))?;
        let mut writer = SegmentWriter::with_segment_size(&dir, segment_bytes);
        let mut meta = IndexMetadata::default();
        for (term, list) in &self.postings {
            let mut list = list.clone();
            list.sort_by_key(|p| p.doc_id);
            let locations = writer.append(&list)?;
            meta.document_frequency.insert(term.clone(), list.len() as u32);
            meta.term_total.insert(term.clone(), list.iter().map(|p| p.tf as u64).sum());
            meta.posting_locations.insert(term.clone(), locations);
        }
        writer.finish()?;
        meta.document_lengths = self.lengths.clone();
        if !self.lengths.is_empty() {
            let total: u64 = self.lengths.values().map(|&l| l as u64).sum();
            meta.average_document_length = total as f64 / self.lengths.len() as f64;
        }
        save_metadata(paths, field, &meta)?;
        Ok(meta)
    }
}

/// A complete snapshot: three fields plus title, pagerank and page-view tables.
#[derive(Debug, Clone)]
pub struct SnapshotFixture {
    pub body: FieldFixture,
    pub title: FieldFixture,
    pub anchor: FieldFixture,
    pub titles: HashMap<DocId, String>,
    pub pagerank: HashMap<DocId, f64>,
    pub pageviews: HashMap<DocId, u64>,
    pub segment_bytes: u64,
}

impl Default for SnapshotFixture {
    fn default() -> Self {
        Self {
            body: FieldFixture::new(),
            title: FieldFixture::new(),
            anchor: FieldFixture::new(),
            titles: HashMap::new(),
            pagerank: HashMap::new(),
            pageviews: HashMap::new(),
            segment_bytes: DEFAULT_SEGMENT_BYTES,
        }
    }
}

impl SnapshotFixture {
    /// Writes everything under `root` using the default resource layout.
    /// Empty tables are not written, so they load as missing.
    pub fn write(&self, root: &Path) -> Result<IndexPaths> {
        let paths = IndexPaths::new(root);
        self.body.write(&paths, Field::Body, self.segment_bytes)?;
        self.title.write(&paths, Field::Title, self.segment_bytes)?;
        self.anchor.write(&paths, Field::Anchor, self.segment_bytes)?;
        let res = ResourcePaths::default();
        if !self.titles.is_empty() {
            if let Some(rel) = res.titles.first() {
                save_blob(&paths.resource(rel), &self.titles)?;
            }
        }
        if !self.pagerank.is_empty() {
            save_blob(&paths.resource(&res.pagerank), &self.pagerank)?;
        }
        if !self.pageviews.is_empty() {
            save_blob(&paths.resource(&res.pageviews), &self.pageviews)?;
        }
        Ok(paths)
    }
}

pub struct SampleDoc {
    pub id: DocId,
    pub title: &'static str,
    pub body: &'static str,
    pub anchor: &'static str,
}

pub const SAMPLE_DOCS: &[SampleDoc] = &[
    SampleDoc {
        id: 10,
        title: "Python (programming language)",
        body: "Python is a programming language. Python code is readable and python programs run everywhere.",
        anchor: "python python python language",
    },
    SampleDoc {
        id: 20,
        title: "Monty Python",
        body: "Monty Python was a British comedy group. The python sketches are famous.",
        anchor: "monty python comedy",
    },
    SampleDoc {
        id: 30,
        title: "Rust (programming language)",
        body: "Rust is a systems programming language focused on memory safety. Rust rust.",
        anchor: "rust language rust",
    },
    SampleDoc {
        id: 40,
        title: "Ball python",
        body: "The ball python is a snake species found in Africa.",
        anchor: "snake",
    },
    SampleDoc {
        id: 50,
        title: "Java (programming language)",
        body: "Java is an enterprise programming language.",
        anchor: "java",
    },
];

/// Five small encyclopedia-style documents with titles, a pagerank entry for
/// docs 10 and 20, and page views for docs 10 and 30.
pub fn sample_snapshot() -> SnapshotFixture {
    let tok = Tokenizer::english();
    let field = |f: fn(&SampleDoc) -> &'static str| {
        let docs: Vec<(DocId, &str)> = SAMPLE_DOCS.iter().map(|d| (d.id, f(d))).collect();
        FieldFixture::from_texts(&tok, &docs)
    };
    SnapshotFixture {
        body: field(|d| d.body),
        title: field(|d| d.title),
        anchor: field(|d| d.anchor),
        titles: SAMPLE_DOCS.iter().map(|d| (d.id, d.title.to_string())).collect(),
        pagerank: HashMap::from([(10, 1e-6), (20, 2e-5)]),
        pageviews: HashMap::from([(10, 1500), (30, 42)]),
        segment_bytes: 4 * crate::codec::RECORD_SIZE as u64,
    }
}

/// Writes `fixture` under `root` and opens a cached store over it.
pub fn open_store(root: &Path, fixture: &SnapshotFixture) -> Result<crate::store::PostingStore> {
    let paths = fixture.write(root)?;
    crate::store::PostingStore::open(&paths, true)
}
