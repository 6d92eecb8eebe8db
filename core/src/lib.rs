//! Query-time ranking over a pre-built inverted index.
//!
//! A snapshot holds three fields (body, title, anchor), each with bincode
//! metadata and segment files of fixed 6-byte posting records, plus optional
//! title and authority tables. [`SearchEngine`] loads it once and answers
//! queries with TF-IDF cosine, BM25, title/anchor match counting, or BM25 fused
//! with title overlap and authority.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod index;
pub mod persist;
pub mod ranking;
pub mod store;
pub mod tables;
pub mod tokenizer;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod testing;

pub use config::{Bm25Params, FusionConfig, ResourcePaths, SearchConfig};
pub use engine::{SearchEngine, SearchHit};
pub use error::{Result, SearchError};
pub use index::{DocId, Field, IndexMetadata, Posting, PostingLocation, Term};
pub use ranking::{BodyRanking, DocScore, RankingStrategy};
pub use store::{FieldView, PostingStore};
pub use tables::{AuthorityTable, TitleTable};
pub use tokenizer::Tokenizer;
