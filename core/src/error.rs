use std::path::PathBuf;

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Build's corpus source path does not exist.
    #[error("corpus not found: {path}")]
    CorpusNotFound { path: PathBuf },

    /// No blob at the store path. `search` maps this to empty results and
    /// `add` starts from an empty index; only direct `load` callers see it.
    #[error("index store missing: {path}")]
    StoreMissing { path: PathBuf },

    /// The blob exists but does not decode into the expected shape, or
    /// carries an unknown format version. Fatal; there are no migrations.
    #[error("malformed index store: {reason}")]
    MalformedStore { reason: String },

    #[error("index store codec: {0}")]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
