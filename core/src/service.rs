use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::corpus::Message;
use crate::error::Error;
use crate::index::{Bm25Index, Bm25Params};
use crate::persist::{self, StoredIndex};
use crate::tokenizer::normalize;

/// Corpus file shape consumed by [`build`]: `{"docs": [...]}`.
#[derive(Debug, Default, Deserialize)]
pub struct CorpusFile {
    #[serde(default)]
    pub docs: Vec<Message>,
}

/// Counts reported by a successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Documents read from the corpus source.
    pub docs: usize,
    /// Ids written to the store, always one per document.
    pub ids: usize,
}

/// Tokenize every message in the corpus file and persist a fresh index.
/// Statistics are not stored; they are recomputed from the tokenized corpus
/// whenever the index is loaded.
pub fn build(corpus_path: &Path, index_path: &Path, params: Bm25Params) -> Result<BuildSummary, Error> {
    if !corpus_path.exists() {
        return Err(Error::CorpusNotFound {
            path: corpus_path.to_path_buf(),
        });
    }
    let file = File::open(corpus_path)?;
    let corpus: CorpusFile = serde_json::from_reader(BufReader::new(file))?;

    let mut doc_ids = Vec::with_capacity(corpus.docs.len());
    let mut tokenized_corpus = Vec::with_capacity(corpus.docs.len());
    for msg in &corpus.docs {
        tokenized_corpus.push(normalize(&msg.searchable_text()));
        doc_ids.push(msg.id.clone().unwrap_or_default());
    }

    let stored = StoredIndex::new(doc_ids, tokenized_corpus, params);
    persist::save(index_path, &stored)?;
    tracing::info!(docs = corpus.docs.len(), ids = stored.len(), "index built");
    Ok(BuildSummary {
        docs: corpus.docs.len(),
        ids: stored.len(),
    })
}

/// Rank every indexed document against `query` and return up to `top_k`
/// `(document id, score)` pairs, descending by score with ties in indexing
/// order. Documents that match no query term are never returned. A missing
/// store means no results, not an error.
pub fn search(index_path: &Path, query: &str, top_k: usize) -> Result<Vec<(String, f64)>, Error> {
    let stored = match persist::load(index_path) {
        Ok(stored) => stored,
        Err(Error::StoreMissing { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let index = Bm25Index::build(&stored.tokenized_corpus, stored.params());
    let query_tokens = normalize(query);
    let scores = index.score_all(&query_tokens);

    let mut ranked: Vec<(usize, f64)> = scores
        .into_iter()
        .enumerate()
        .filter(|&(_, score)| score > 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    ranked.truncate(top_k);

    Ok(ranked
        .into_iter()
        .map(|(ordinal, score)| (stored.doc_ids[ordinal].clone(), score))
        .collect())
}

/// Append `docs` to the persisted corpus and rebuild under the given
/// parameters, which may differ from the previous build's. Existing
/// documents keep their ordinals; new ones are appended after them. The
/// whole combined corpus is rewritten, so the cost is proportional to total
/// corpus size, not to the number of new documents. Returns the number of
/// documents added.
pub fn add_documents(index_path: &Path, docs: &[Message], params: Bm25Params) -> Result<usize, Error> {
    let stored = match persist::load(index_path) {
        Ok(stored) => stored,
        Err(Error::StoreMissing { .. }) => {
            tracing::warn!(path = %index_path.display(), "no existing index, creating new");
            StoredIndex::empty(params)
        }
        Err(e) => return Err(e),
    };

    let (mut doc_ids, mut tokenized_corpus) = stored.into_parts();
    for msg in docs {
        tokenized_corpus.push(normalize(&msg.searchable_text()));
        doc_ids.push(msg.external_id());
    }

    let stored = StoredIndex::new(doc_ids, tokenized_corpus, params);
    persist::save(index_path, &stored)?;
    tracing::info!(added = docs.len(), total = stored.len(), "index extended");
    Ok(docs.len())
}
