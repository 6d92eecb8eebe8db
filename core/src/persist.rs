use crate::error::{Result, SearchError};
use crate::index::{DocId, Field, IndexMetadata};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "index.meta";

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn field_dir(&self, field: Field) -> PathBuf { self.root.join(field.dir_name()) }
    pub fn metadata(&self, field: Field) -> PathBuf { self.field_dir(field).join(METADATA_FILE) }
    /// Resolves a resource path given relative to the index root.
    pub fn resource(&self, rel: &str) -> PathBuf { self.root.join(rel) }
}

pub fn save_metadata(paths: &IndexPaths, field: Field, meta: &IndexMetadata) -> Result<()> {
    create_dir_all(paths.field_dir(field)).map_err(|e| SearchError::io(paths.field_dir(field), e))?;
    save_blob(&paths.metadata(field), meta)
}

/// Loads a field's metadata. A missing file is reported as
/// [`SearchError::MissingIndex`] since every field index is mandatory.
pub fn load_metadata(paths: &IndexPaths, field: Field) -> Result<IndexMetadata> {
    let path = paths.metadata(field);
    match load_optional_blob::<IndexMetadata>(&path)? {
        Some(meta) => Ok(meta.normalized()),
        None => Err(SearchError::MissingIndex { field, path }),
    }
}

pub fn save_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).map_err(|e| SearchError::io(dir, e))?;
    }
    let bytes = bincode::serialize(value).map_err(|source| SearchError::Encode { path: path.to_path_buf(), source })?;
    let mut f = File::create(path).map_err(|e| SearchError::io(path, e))?;
    f.write_all(&bytes).map_err(|e| SearchError::io(path, e))?;
    Ok(())
}

/// `Ok(None)` when the file does not exist; an error when it exists but cannot
/// be read or decoded.
pub fn load_optional_blob<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(mut f) = open_optional(path)? else {
        return Ok(None);
    };
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| SearchError::io(path, e))?;
    let value = bincode::deserialize(&buf).map_err(|source| SearchError::Decode { path: path.to_path_buf(), source })?;
    Ok(Some(value))
}

/// Reads a gzip-compressed, headerless two-column table of `doc_id,value`.
/// Blank lines are skipped.
pub fn load_optional_gz_table(path: &Path) -> Result<Option<HashMap<DocId, f64>>> {
    let Some(f) = open_optional(path)? else {
        return Ok(None);
    };
    let reader = BufReader::new(GzDecoder::new(f));
    let mut table = HashMap::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SearchError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (id, value) = parse_row(line).map_err(|reason| SearchError::Table {
            path: path.to_path_buf(),
            line: n + 1,
            reason,
        })?;
        table.insert(id, value);
    }
    Ok(Some(table))
}

fn parse_row(line: &str) -> std::result::Result<(DocId, f64), String> {
    let mut cols = line.splitn(2, ',');
    let id = cols.next().unwrap_or_default().trim();
    let value = cols.next().ok_or_else(|| "expected two columns".to_string())?.trim();
    let id = id.parse::<DocId>().map_err(|e| format!("bad id {id:?}: {e}"))?;
    let value = value.parse::<f64>().map_err(|e| format!("bad value {value:?}: {e}"))?;
    Ok((id, value))
}

fn open_optional(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(f) => Ok(Some(f)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SearchError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Term;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::tempdir;

    #[test]
    fn metadata_roundtrip_normalizes() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut meta = IndexMetadata::default();
        meta.document_frequency.insert(Term::new("rust").unwrap(), 1);
        meta.document_lengths.insert(3, 12);
        save_metadata(&paths, Field::Title, &meta).unwrap();

        let loaded = load_metadata(&paths, Field::Title).unwrap();
        assert_eq!(loaded.df("rust"), 1);
        assert_eq!(loaded.corpus_size, 1);
        assert!((loaded.average_document_length - 12.0).abs() < 1e-9);
    }

    #[test]
    fn missing_metadata_is_fatal() {
        let dir = tempdir().unwrap();
        let err = load_metadata(&IndexPaths::new(dir.path()), Field::Body).unwrap_err();
        assert!(matches!(err, SearchError::MissingIndex { field: Field::Body, .. }));
    }

    #[test]
    fn optional_blob_distinguishes_missing_from_corrupt() {
        let dir = tempdir().unwrap();
        let missing: Option<HashMap<DocId, f64>> = load_optional_blob(&dir.path().join("nope.bin")).unwrap();
        assert!(missing.is_none());

        let bad = dir.path().join("bad.bin");
        std::fs::write(&bad, [1u8, 2, 3]).unwrap();
        let err = load_optional_blob::<HashMap<DocId, f64>>(&bad).unwrap_err();
        assert!(matches!(err, SearchError::Decode { .. }));
    }

    #[test]
    fn reads_gzip_csv_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pr.csv.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"12,0.5\n7,1.25e-6\n\n").unwrap();
        enc.finish().unwrap();

        let table = load_optional_gz_table(&path).unwrap().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&12], 0.5);
        assert!((table[&7] - 1.25e-6).abs() < 1e-12);
        assert!(load_optional_gz_table(&dir.path().join("none.gz")).unwrap().is_none());
    }

    #[test]
    fn malformed_gzip_row_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pr.csv.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"12,0.5\nabc,1\n").unwrap();
        enc.finish().unwrap();
        let err = load_optional_gz_table(&path).unwrap_err();
        assert!(matches!(err, SearchError::Table { line: 2, .. }));
    }
}
