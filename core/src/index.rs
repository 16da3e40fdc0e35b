use std::collections::{HashMap, HashSet};

/// BM25 tuning parameters, fixed at build time and persisted with the index.
/// Changing either requires a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length-normalization strength.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Okapi BM25 term statistics over a tokenized corpus.
///
/// Derived wholesale from the token sequences by [`Bm25Index::build`] and
/// replaced, never patched, when the corpus changes. Documents are addressed
/// by ordinal position, the index of their token sequence in the corpus.
pub struct Bm25Index {
    params: Bm25Params,
    /// Raw term counts per document, by ordinal.
    term_freqs: Vec<HashMap<String, u32>>,
    /// Token count per document, by ordinal.
    doc_lens: Vec<u32>,
    /// Number of documents containing each term at least once.
    doc_freqs: HashMap<String, u32>,
    avg_doc_len: f64,
}

impl Bm25Index {
    /// Derive all statistics from a tokenized corpus in one pass.
    pub fn build(corpus: &[Vec<String>], params: Bm25Params) -> Self {
        let mut term_freqs = Vec::with_capacity(corpus.len());
        let mut doc_lens = Vec::with_capacity(corpus.len());
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut total_len: u64 = 0;

        for tokens in corpus {
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += tokens.len() as u64;
            doc_lens.push(tokens.len() as u32);
            term_freqs.push(freqs);
        }

        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            total_len as f64 / doc_lens.len() as f64
        };

        Self {
            params,
            term_freqs,
            doc_lens,
            doc_freqs,
            avg_doc_len,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Number of documents containing `term` at least once.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Mean token count across the corpus; 0.0 for an empty corpus.
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    /// Smoothed inverse document frequency,
    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`. Non-negative for any df in
    /// `[0, N]`.
    fn idf(&self, term: &str) -> f64 {
        let n = self.len() as f64;
        let df = f64::from(self.doc_frequency(term));
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn term_contribution(&self, term: &str, idf: f64, ordinal: usize) -> f64 {
        let tf = f64::from(self.term_freqs[ordinal].get(term).copied().unwrap_or(0));
        if tf == 0.0 {
            return 0.0;
        }
        let Bm25Params { k1, b } = self.params;
        let doc_len = f64::from(self.doc_lens[ordinal]);
        let norm = 1.0 - b + b * doc_len / self.avg_doc_len;
        idf * (tf * (k1 + 1.0)) / (tf + k1 * norm)
    }

    /// BM25 score of one document against a tokenized query. Each distinct
    /// query term contributes once; terms the document lacks contribute 0.
    pub fn score(&self, query_tokens: &[String], ordinal: usize) -> f64 {
        let mut seen = HashSet::new();
        query_tokens
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .map(|t| self.term_contribution(t, self.idf(t), ordinal))
            .sum()
    }

    /// Score every document in the corpus, by ordinal. The whole corpus is
    /// scanned on every query; there is no early termination.
    pub fn score_all(&self, query_tokens: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.len()];
        let mut seen = HashSet::new();
        for term in query_tokens {
            if !seen.insert(term.as_str()) {
                continue;
            }
            // A term no document contains cannot contribute anywhere.
            if self.doc_frequency(term) == 0 {
                continue;
            }
            let idf = self.idf(term);
            for (ordinal, score) in scores.iter_mut().enumerate() {
                *score += self.term_contribution(term, idf, ordinal);
            }
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn tiny_corpus() -> Vec<Vec<String>> {
        vec![
            toks(&["the", "cat", "sat"]),
            toks(&["the", "dog", "ran"]),
        ]
    }

    #[test]
    fn discriminative_term_scores_only_its_document() {
        let index = Bm25Index::build(&tiny_corpus(), Bm25Params::default());
        let scores = index.score_all(&toks(&["cat"]));
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn common_term_scores_both_documents_near_equal() {
        let index = Bm25Index::build(&tiny_corpus(), Bm25Params::default());
        let scores = index.score_all(&toks(&["the"]));
        assert!(scores[0] > 0.0);
        assert!(scores[1] > 0.0);
        assert!((scores[0] - scores[1]).abs() < 1e-9);
        // Low discriminative power: well below a unique term's score.
        let cat = index.score_all(&toks(&["cat"]));
        assert!(scores[0] < cat[0]);
    }

    #[test]
    fn unknown_term_scores_zero_everywhere() {
        let index = Bm25Index::build(&tiny_corpus(), Bm25Params::default());
        assert!(index.score_all(&toks(&["zebra"])).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_query_scores_zero() {
        let index = Bm25Index::build(&tiny_corpus(), Bm25Params::default());
        assert_eq!(index.score_all(&[]), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_corpus_scores_nothing() {
        let index = Bm25Index::build(&[], Bm25Params::default());
        assert!(index.is_empty());
        assert!(index.score_all(&toks(&["cat"])).is_empty());
    }

    #[test]
    fn duplicate_query_terms_count_once() {
        let index = Bm25Index::build(&tiny_corpus(), Bm25Params::default());
        let once = index.score(&toks(&["cat"]), 0);
        let twice = index.score(&toks(&["cat", "cat"]), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn score_matches_score_all() {
        let corpus = vec![
            toks(&["alpha", "beta", "beta"]),
            toks(&["beta", "gamma"]),
            toks(&["alpha", "gamma", "delta", "delta"]),
        ];
        let index = Bm25Index::build(&corpus, Bm25Params::default());
        let query = toks(&["beta", "delta"]);
        let all = index.score_all(&query);
        for (ordinal, &expected) in all.iter().enumerate() {
            assert!((index.score(&query, ordinal) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn idf_is_nonnegative_at_every_df() {
        // One term in every document, one in a single document.
        let corpus = vec![
            toks(&["common", "rare"]),
            toks(&["common"]),
            toks(&["common"]),
        ];
        let index = Bm25Index::build(&corpus, Bm25Params::default());
        for scores in [
            index.score_all(&toks(&["common"])),
            index.score_all(&toks(&["rare"])),
        ] {
            assert!(scores.iter().all(|&s| s >= 0.0));
        }
    }

    #[test]
    fn length_normalization_favors_shorter_document() {
        // Same tf for "term" in both docs, but doc 1 is longer.
        let corpus = vec![
            toks(&["term", "pad"]),
            toks(&["term", "pad", "pad", "pad", "pad", "pad"]),
        ];
        let index = Bm25Index::build(&corpus, Bm25Params::default());
        let scores = index.score_all(&toks(&["term"]));
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn statistics_accessors() {
        let index = Bm25Index::build(&tiny_corpus(), Bm25Params::default());
        assert_eq!(index.len(), 2);
        assert_eq!(index.doc_frequency("the"), 2);
        assert_eq!(index.doc_frequency("cat"), 1);
        assert_eq!(index.doc_frequency("zebra"), 0);
        assert_eq!(index.avg_doc_len(), 3.0);
    }
}
