use std::path::Path;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::fusion::fuse;
use crate::index::{Field, Term};
use crate::persist::IndexPaths;
use crate::ranking::{AnchorFrequency, Bm25, BodyRanking, DocScore, RankingStrategy, TfIdfCosine, TitleMatch};
use crate::store::PostingStore;
use crate::tables::{AuthorityTable, TitleTable};
use crate::tokenizer::Tokenizer;

/// `(document id, display title)` as handed to callers.
pub type SearchHit = (String, String);

/// Read-only snapshot of everything a query needs. Build once, then share
/// (e.g. behind an `Arc`) across request workers.
pub struct SearchEngine {
    tokenizer: Tokenizer,
    store: PostingStore,
    titles: TitleTable,
    authority: AuthorityTable,
    config: SearchConfig,
}

impl SearchEngine {
    /// Loads the snapshot under `root`. Missing field indices are fatal;
    /// missing or unreadable title and authority tables are not.
    pub fn open<P: AsRef<Path>>(root: P, config: SearchConfig) -> Result<Self> {
        let paths = IndexPaths::new(root);
        let tokenizer = match &config.stopwords_path {
            Some(p) => Tokenizer::from_stopword_file(p),
            None => Tokenizer::english(),
        };
        let store = PostingStore::open(&paths, config.cache_postings)?.with_cache_limit(config.cache_terms);
        let titles = TitleTable::load(&paths, &config.resources.titles);
        let authority = AuthorityTable::load(&paths, &config.resources);
        tracing::info!(root = %paths.root.display(), "search engine ready");
        Ok(Self { tokenizer, store, titles, authority, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &PostingStore {
        &self.store
    }

    pub fn tokenize(&self, text: &str) -> Vec<Term> {
        self.tokenizer.tokenize(text)
    }

    /// Runs `strategy` over one field. Blank queries rank nothing.
    pub fn rank(&self, field: Field, strategy: &dyn RankingStrategy, text: &str) -> Vec<DocScore> {
        let terms = self.tokenize(text);
        if terms.is_empty() {
            return Vec::new();
        }
        let Some(view) = self.store.view(field) else {
            return Vec::new();
        };
        let ranked = strategy.rank(&view, &terms);
        tracing::debug!(%field, strategy = strategy.name(), terms = terms.len(), hits = ranked.len(), "ranked");
        ranked
    }

    pub fn search_body(&self, text: &str) -> Vec<SearchHit> {
        self.search_body_with(text, self.config.body_ranking)
    }

    pub fn search_body_with(&self, text: &str, ranking: BodyRanking) -> Vec<SearchHit> {
        match ranking {
            BodyRanking::TfIdf => {
                let tfidf = TfIdfCosine { top_k: self.config.body_top_k, corpus_size: self.config.corpus_size };
                self.hits(self.rank(Field::Body, &tfidf, text))
            }
            BodyRanking::Bm25 => {
                let bm25 = Bm25::from(self.config.bm25);
                let mut hits = self.hits(self.rank(Field::Body, &bm25, text));
                hits.truncate(self.config.body_top_k);
                hits
            }
        }
    }

    /// Every document whose title holds a query term, by distinct terms matched.
    pub fn search_title(&self, text: &str) -> Vec<SearchHit> {
        self.hits(self.rank(Field::Title, &TitleMatch, text))
    }

    /// Every document whose anchor text holds a query term, by summed frequency.
    pub fn search_anchor(&self, text: &str) -> Vec<SearchHit> {
        self.hits(self.rank(Field::Anchor, &AnchorFrequency, text))
    }

    /// BM25 over the body fused with title overlap and authority.
    pub fn search(&self, text: &str) -> Vec<SearchHit> {
        let terms = self.tokenize(text);
        if terms.is_empty() {
            return Vec::new();
        }
        let Some(view) = self.store.view(Field::Body) else {
            return Vec::new();
        };
        let scores = Bm25::from(self.config.bm25).scores(&view, &terms);
        let fused = fuse(&scores, &terms, &self.titles, &self.authority, &self.config.fusion);
        tracing::debug!(candidates = scores.len(), hits = fused.len(), "fused");
        self.hits(fused)
    }

    pub fn get_authority<S: AsRef<str>>(&self, ids: &[S]) -> Vec<f64> {
        self.authority.rank_batch(ids)
    }

    pub fn get_views<S: AsRef<str>>(&self, ids: &[S]) -> Vec<u64> {
        self.authority.views_batch(ids)
    }

    fn hits(&self, ranked: Vec<DocScore>) -> Vec<SearchHit> {
        ranked
            .into_iter()
            .map(|d| (d.doc_id.to_string(), self.titles.resolve(d.doc_id)))
            .collect()
    }
}
