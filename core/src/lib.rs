//! BM25 lexical search over archives of short chat messages.
//!
//! The engine tokenizes messages into a bag of terms, keeps the tokenized
//! corpus as the persisted source of truth, and recomputes Okapi BM25
//! statistics from it on load. Ranking scans every document on every query,
//! which is the right tradeoff for corpora of thousands of short messages.

pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod rerank;
pub mod service;
pub mod tokenizer;

pub use corpus::Message;
pub use error::Error;
pub use index::{Bm25Index, Bm25Params};
pub use persist::StoredIndex;
