//! Interface to the second-stage semantic reranker.
//!
//! The relevance model itself (a cross-encoder) lives outside this crate.
//! Anything that can score a (query, candidate text) pair plugs in through
//! [`RelevanceModel`], whether a remote call or a local inference binding;
//! this module only prepares candidate text and orders the results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Thread-parent snippets longer than this are cut before scoring.
const THREAD_SNIPPET_CHARS: usize = 100;

/// Black-box relevance scorer supplied by an external model-serving
/// component.
pub trait RelevanceModel {
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// A search hit resolved back to displayable message content, the unit the
/// reranker scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub thread_parent_text: Option<String>,
}

impl Candidate {
    /// Flatten the candidate into the labeled, `" | "`-joined form the
    /// relevance model scores against. Absent or empty parts are omitted.
    pub fn prepared_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = present(&self.text) {
            parts.push(format!("Message: {text}"));
        }
        if let Some(author) = present(&self.author) {
            parts.push(format!("From: {author}"));
        }
        if let Some(channel) = present(&self.channel_name) {
            parts.push(format!("Channel: #{channel}"));
        }
        if let Some(thread) = present(&self.thread_parent_text) {
            let head: String = thread.chars().take(THREAD_SNIPPET_CHARS).collect();
            parts.push(format!("Thread: {head}"));
        }
        parts.join(" | ")
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Score every candidate and return `(candidate index, score)` pairs sorted
/// descending by score, ties in candidate order, truncated to `top_k`.
pub fn rerank<M: RelevanceModel>(
    model: &M,
    query: &str,
    candidates: &[Candidate],
    top_k: usize,
) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, model.score(query, &c.prepared_text())))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    ranked.truncate(top_k);
    ranked
}
