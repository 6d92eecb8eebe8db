use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use crate::codec::{decode_postings, RECORD_SIZE};
use crate::error::{Result, SearchError};
use crate::index::{Field, IndexMetadata, Posting, Term};
use crate::persist::{load_metadata, IndexPaths};

struct FieldIndex {
    dir: PathBuf,
    meta: IndexMetadata,
    // posting lists never change once written, so a racing insert is harmless
    cache: RwLock<HashMap<Term, Arc<[Posting]>>>,
}

/// Cached posting lists per field unless [`PostingStore::with_cache_limit`]
/// says otherwise.
pub const DEFAULT_CACHE_TERMS: usize = 100_000;

/// Binary posting lists of every field, with their metadata. Immutable after
/// [`PostingStore::open`]; safe to share across request threads.
///
/// The read-through cache never evicts. Once a field holds `cache_limit`
/// lists, further lists are decoded on every read.
pub struct PostingStore {
    fields: HashMap<Field, FieldIndex>,
    cache_enabled: bool,
    cache_limit: usize,
}

impl PostingStore {
    /// Loads the metadata of all fields. Each field index is mandatory.
    pub fn open(paths: &IndexPaths, cache_enabled: bool) -> Result<Self> {
        let mut fields = HashMap::new();
        for field in Field::ALL {
            let meta = load_metadata(paths, field)?;
            tracing::info!(
                %field,
                terms = meta.num_terms(),
                corpus_size = meta.corpus_size,
                avg_len = meta.average_document_length,
                "loaded field index"
            );
            fields.insert(
                field,
                FieldIndex { dir: paths.field_dir(field), meta, cache: RwLock::new(HashMap::new()) },
            );
        }
        Ok(Self { fields, cache_enabled, cache_limit: DEFAULT_CACHE_TERMS })
    }

    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = limit;
        self
    }

    pub fn metadata(&self, field: Field) -> Option<&IndexMetadata> {
        self.fields.get(&field).map(|f| &f.meta)
    }

    pub fn view(&self, field: Field) -> Option<FieldView<'_>> {
        let meta = self.metadata(field)?;
        Some(FieldView { store: self, field, meta })
    }

    /// Decodes the posting list of `term`. Terms absent from the field's
    /// document-frequency table yield an empty list.
    pub fn read_posting_list(&self, field: Field, term: &Term) -> Result<Arc<[Posting]>> {
        let Some(index) = self.fields.get(&field) else {
            return Ok(empty());
        };
        let Some(&df) = index.meta.document_frequency.get(term) else {
            return Ok(empty());
        };
        if self.cache_enabled {
            if let Some(hit) = index.cache.read().get(term) {
                return Ok(Arc::clone(hit));
            }
        }
        let postings: Arc<[Posting]> = read_from_segments(index, field, term, df as usize)?.into();
        if self.cache_enabled {
            let mut cache = index.cache.write();
            if cache.len() < self.cache_limit {
                cache.insert(term.clone(), Arc::clone(&postings));
            }
        }
        Ok(postings)
    }

    pub fn cached_terms(&self, field: Field) -> usize {
        self.fields.get(&field).map(|f| f.cache.read().len()).unwrap_or(0)
    }
}

// Reads `df` records spread over the term's locations: each location supplies
// what is still missing, up to the end of its segment.
fn read_from_segments(index: &FieldIndex, field: Field, term: &Term, df: usize) -> Result<Vec<Posting>> {
    let expected = df * RECORD_SIZE;
    // grows by what each segment actually holds; `df` itself may be corrupt
    let mut buf = Vec::new();
    for loc in index.meta.locations(term.as_str()) {
        let remaining = expected - buf.len();
        if remaining == 0 {
            break;
        }
        let path = index.dir.join(&loc.segment);
        let mut f = File::open(&path).map_err(|e| SearchError::io(&path, e))?;
        let seg_len = f.metadata().map_err(|e| SearchError::io(&path, e))?.len();
        let available = seg_len.saturating_sub(loc.offset) as usize;
        let take = remaining.min(available);
        f.seek(SeekFrom::Start(loc.offset)).map_err(|e| SearchError::io(&path, e))?;
        let start = buf.len();
        buf.resize(start + take, 0);
        f.read_exact(&mut buf[start..]).map_err(|e| SearchError::io(&path, e))?;
    }
    let postings = decode_postings(&buf);
    if buf.len() != expected || postings.len() != df {
        return Err(SearchError::CorruptPostings {
            field,
            term: term.to_string(),
            expected: df,
            found: postings.len(),
        });
    }
    Ok(postings)
}

fn empty() -> Arc<[Posting]> {
    Arc::from(Vec::new())
}

/// One field of a [`PostingStore`], as seen by the ranking strategies.
#[derive(Clone, Copy)]
pub struct FieldView<'a> {
    store: &'a PostingStore,
    field: Field,
    meta: &'a IndexMetadata,
}

impl<'a> FieldView<'a> {
    pub fn field(&self) -> Field {
        self.field
    }

    pub fn meta(&self) -> &'a IndexMetadata {
        self.meta
    }

    /// Posting list for `term`; a list that cannot be read is logged and
    /// treated as empty so the rest of the query still scores.
    pub fn postings(&self, term: &Term) -> Arc<[Posting]> {
        match self.store.read_posting_list(self.field, term) {
            Ok(postings) => postings,
            Err(err) => {
                tracing::warn!(field = %self.field, %term, %err, "dropping unreadable posting list");
                empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{open_store, FieldFixture, SnapshotFixture};
    use tempfile::tempdir;

    fn fixture() -> SnapshotFixture {
        let mut body = FieldFixture::new();
        for doc in 1..=5 {
            body = body.posting("alpha", doc, doc * 10).length(doc, 20);
        }
        body = body.posting("beta", 2, 1).posting("beta", 4, 70_000);
        SnapshotFixture { body, segment_bytes: 4 * RECORD_SIZE as u64, ..SnapshotFixture::default() }
    }

    fn term(s: &str) -> Term {
        Term::new(s).unwrap()
    }

    #[test]
    fn reads_lists_spanning_segments() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), &fixture()).unwrap();
        let meta = store.metadata(Field::Body).unwrap();
        assert_eq!(meta.locations("alpha").len(), 2);

        let alpha = store.read_posting_list(Field::Body, &term("alpha")).unwrap();
        assert_eq!(alpha.len(), meta.df("alpha") as usize);
        let total: u64 = alpha.iter().map(|p| p.tf as u64).sum();
        assert_eq!(total, meta.term_total[&term("alpha")]);
        assert_eq!(alpha[4], Posting::new(5, 50));

        let beta = store.read_posting_list(Field::Body, &term("beta")).unwrap();
        assert_eq!(&beta[..], &[Posting::new(2, 1), Posting::new(4, 70_000 & 0xFFFF)]);
    }

    #[test]
    fn absent_term_is_empty() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), &fixture()).unwrap();
        assert!(store.read_posting_list(Field::Body, &term("gamma")).unwrap().is_empty());
        assert!(store.read_posting_list(Field::Title, &term("alpha")).unwrap().is_empty());
    }

    #[test]
    fn repeated_reads_are_identical_and_cached() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), &fixture()).unwrap();
        let first = store.read_posting_list(Field::Body, &term("alpha")).unwrap();
        let second = store.read_posting_list(Field::Body, &term("alpha")).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.cached_terms(Field::Body), 1);

        let uncached = PostingStore::open(&crate::persist::IndexPaths::new(dir.path()), false).unwrap();
        let third = uncached.read_posting_list(Field::Body, &term("alpha")).unwrap();
        assert_eq!(first, third);
        assert_eq!(uncached.cached_terms(Field::Body), 0);
    }

    #[test]
    fn truncated_segment_is_corruption_for_that_term_only() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), &fixture()).unwrap();
        // segment 001 holds alpha's last record followed by both beta records
        let seg = dir.path().join("body").join("001.bin");
        let f = std::fs::OpenOptions::new().write(true).open(&seg).unwrap();
        f.set_len(RECORD_SIZE as u64).unwrap();

        let err = store.read_posting_list(Field::Body, &term("beta")).unwrap_err();
        assert!(err.is_corruption());
        assert!(matches!(err, SearchError::CorruptPostings { expected: 2, found: 0, .. }));
        assert_eq!(store.read_posting_list(Field::Body, &term("alpha")).unwrap().len(), 5);

        let view = store.view(Field::Body).unwrap();
        assert!(view.postings(&term("beta")).is_empty());
    }

    #[test]
    fn cache_stops_growing_at_its_limit() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), &fixture()).unwrap().with_cache_limit(1);
        store.read_posting_list(Field::Body, &term("alpha")).unwrap();
        let beta = store.read_posting_list(Field::Body, &term("beta")).unwrap();
        assert_eq!(beta.len(), 2);
        assert_eq!(store.cached_terms(Field::Body), 1);
        assert_eq!(store.read_posting_list(Field::Body, &term("beta")).unwrap(), beta);
        assert_eq!(store.cached_terms(Field::Body), 1);
    }

    #[test]
    fn huge_document_frequency_is_corruption() {
        let dir = tempdir().unwrap();
        let paths = fixture().write(dir.path()).unwrap();
        let mut meta = load_metadata(&paths, Field::Body).unwrap();
        meta.document_frequency.insert(term("alpha"), u32::MAX);
        crate::persist::save_metadata(&paths, Field::Body, &meta).unwrap();

        let store = PostingStore::open(&paths, true).unwrap();
        let err = store.read_posting_list(Field::Body, &term("alpha")).unwrap_err();
        assert!(matches!(err, SearchError::CorruptPostings { found: 7, .. }));
        assert_eq!(store.read_posting_list(Field::Body, &term("beta")).unwrap().len(), 2);
    }

    #[test]
    fn missing_field_index_fails_open() {
        let dir = tempdir().unwrap();
        let paths = fixture().write(dir.path()).unwrap();
        std::fs::remove_file(paths.metadata(Field::Anchor)).unwrap();
        let err = PostingStore::open(&paths, true).err().unwrap();
        assert!(matches!(err, SearchError::MissingIndex { field: Field::Anchor, .. }));
    }
}
