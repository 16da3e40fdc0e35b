use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Error;
use crate::index::Bm25Params;

/// On-disk format version. A blob with any other version is rejected
/// outright; there are no migrations.
const FORMAT_VERSION: u32 = 1;

/// The persisted source of truth: the parallel id/token sequences plus the
/// BM25 parameters they were built with. `doc_ids[i]` names the document
/// whose tokens are `tokenized_corpus[i]`; the two stay the same length at
/// all times. Derived statistics are recomputed from here on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredIndex {
    version: u32,
    pub doc_ids: Vec<String>,
    pub tokenized_corpus: Vec<Vec<String>>,
    k1: f64,
    b: f64,
}

impl StoredIndex {
    pub fn new(
        doc_ids: Vec<String>,
        tokenized_corpus: Vec<Vec<String>>,
        params: Bm25Params,
    ) -> Self {
        debug_assert_eq!(doc_ids.len(), tokenized_corpus.len());
        Self {
            version: FORMAT_VERSION,
            doc_ids,
            tokenized_corpus,
            k1: params.k1,
            b: params.b,
        }
    }

    pub fn empty(params: Bm25Params) -> Self {
        Self::new(Vec::new(), Vec::new(), params)
    }

    pub fn params(&self) -> Bm25Params {
        Bm25Params {
            k1: self.k1,
            b: self.b,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Surrender the id and token sequences, e.g. to append and rebuild.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.doc_ids, self.tokenized_corpus)
    }
}

/// Atomically replace the blob at `path`. The bytes land in a temp file in
/// the destination directory first and are renamed over the target, so a
/// concurrent reader observes either the old blob or the new one, never a
/// partial write. Parent directories are created as needed.
pub fn save(path: &Path, stored: &StoredIndex) -> Result<(), Error> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }
    let bytes = bincode::serialize(stored)?;
    let mut tmp = NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
    tmp.write_all(&bytes)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Load the blob at `path`. Missing path is `StoreMissing`; a blob that does
/// not decode, or whose version is unknown, is `MalformedStore`.
pub fn load(path: &Path) -> Result<StoredIndex, Error> {
    if !path.exists() {
        return Err(Error::StoreMissing {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    let stored: StoredIndex = bincode::deserialize(&bytes).map_err(|e| Error::MalformedStore {
        reason: e.to_string(),
    })?;
    if stored.version != FORMAT_VERSION {
        return Err(Error::MalformedStore {
            reason: format!("unsupported format version {}", stored.version),
        });
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoredIndex {
        StoredIndex::new(
            vec!["1".into(), "2".into()],
            vec![
                vec!["the".into(), "cat".into(), "sat".into()],
                vec!["the".into(), "dog".into(), "ran".into()],
            ],
            Bm25Params::default(),
        )
    }

    #[test]
    fn round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        let stored = sample();
        save(&path, &stored).unwrap();
        assert_eq!(load(&path).unwrap(), stored);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/index.bin");
        save(&path, &sample()).unwrap();
        assert!(load(&path).is_ok());
    }

    #[test]
    fn missing_path_is_store_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, Error::StoreMissing { .. }));
    }

    #[test]
    fn garbage_blob_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        fs::write(&path, b"not a serialized index").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::MalformedStore { .. }));
    }

    #[test]
    fn unknown_version_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        // Same field layout as StoredIndex, future version number.
        let bytes = bincode::serialize(&(
            99u32,
            Vec::<String>::new(),
            Vec::<Vec<String>>::new(),
            1.2f64,
            0.75f64,
        ))
        .unwrap();
        fs::write(&path, bytes).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::MalformedStore { .. }));
    }

    #[test]
    fn save_replaces_existing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        save(&path, &sample()).unwrap();
        let replacement = StoredIndex::new(
            vec!["3".into()],
            vec![vec!["owl".into()]],
            Bm25Params { k1: 1.5, b: 0.5 },
        );
        save(&path, &replacement).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, replacement);
        assert_eq!(loaded.params(), Bm25Params { k1: 1.5, b: 0.5 });
    }
}
