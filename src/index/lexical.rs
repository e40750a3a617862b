//! BM25 lexical sub-index
//!
//! Inverted term statistics over the chunk set, scored with Okapi BM25
//! (k1 = 1.2, b = 0.75). Construction is deterministic for a fixed chunk
//! sequence, and ties are broken by insertion position so repeated builds
//! answer queries in the same order.

use std::collections::HashMap;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Inverted-index term statistics for BM25 scoring
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    /// term -> list of (chunk position, term frequency)
    postings: HashMap<String, Vec<(usize, usize)>>,
    /// chunk position -> token count
    doc_lengths: Vec<usize>,
    avg_doc_length: f64,
}

impl LexicalIndex {
    /// Build the index over chunk texts, positions matching input order
    pub fn build(texts: &[&str]) -> Self {
        let mut postings: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(texts.len());

        for (position, text) in texts.iter().enumerate() {
            let tokens = tokenize(text);
            doc_lengths.push(tokens.len());

            let mut counts: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in counts {
                postings.entry(term).or_default().push((position, tf));
            }
        }

        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            doc_lengths.iter().sum::<usize>() as f64 / doc_lengths.len() as f64
        };

        Self {
            postings,
            doc_lengths,
            avg_doc_length,
        }
    }

    /// Top-k chunk positions for a query, highest BM25 score first
    ///
    /// Positions with zero overlap with the query are never returned.
    pub fn query(&self, question: &str, k: usize) -> Vec<(usize, f64)> {
        let n = self.doc_lengths.len();
        if n == 0 || k == 0 {
            return Vec::new();
        }

        let mut scores: HashMap<usize, f64> = HashMap::new();
        for term in tokenize(question) {
            let Some(posting) = self.postings.get(&term) else {
                continue;
            };

            let df = posting.len() as f64;
            let idf = (((n as f64 - df + 0.5) / (df + 0.5)) + 1.0).ln();

            for &(position, tf) in posting {
                let tf = tf as f64;
                let len_norm = self.doc_lengths[position] as f64 / self.avg_doc_length.max(1e-9);
                let score = idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * len_norm));
                *scores.entry(position).or_insert(0.0) += score;
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        ranked
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    /// True when no chunks are indexed
    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }
}

/// Lowercased alphanumeric tokens
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_term_match_ranks_first() {
        let texts = vec![
            "The Eiffel Tower is 330m tall.",
            "Paris is the capital of France.",
            "Rust is a systems programming language.",
        ];
        let index = LexicalIndex::build(&texts);
        let results = index.query("how tall is the eiffel tower", 3);
        assert!(!results.is_empty());
        assert_eq!(results[0].0, 0);
    }

    #[test]
    fn test_no_overlap_returns_nothing() {
        let texts = vec!["alpha beta gamma"];
        let index = LexicalIndex::build(&texts);
        assert!(index.query("unrelated words entirely", 5).is_empty());
    }

    #[test]
    fn test_k_bounds_results() {
        let texts = vec!["tower one", "tower two", "tower three", "tower four"];
        let index = LexicalIndex::build(&texts);
        assert_eq!(index.query("tower", 2).len(), 2);
    }

    #[test]
    fn test_deterministic_ordering() {
        let texts = vec!["same words here", "same words here too", "same words here also"];
        let index = LexicalIndex::build(&texts);
        let a = index.query("same words", 3);
        let b = index.query("same words", 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_index() {
        let index = LexicalIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.query("anything", 5).is_empty());
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokenize("Eiffel-Tower, 330m!"), vec!["eiffel", "tower", "330m"]);
    }
}
