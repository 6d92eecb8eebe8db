use crate::index::Field;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("cannot encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed table row {line} in {path}: {reason}")]
    Table {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("mandatory {field} index missing at {path}")]
    MissingIndex { field: Field, path: PathBuf },

    #[error("corrupted posting list for '{term}' in {field}: expected {expected} records, decoded {found}")]
    CorruptPostings {
        field: Field,
        term: String,
        expected: usize,
        found: usize,
    },
}

impl SearchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SearchError::Io { path: path.into(), source }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, SearchError::CorruptPostings { .. })
    }
}
