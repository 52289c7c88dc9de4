// ============================================================
// Layer 3 — Vocabulary Domain Type
// ============================================================
// Maps each token to the row of the embedding table that
// holds its learned vector.
//
// Iteration order matters: the neighbour ranking is a stable
// sort, so two tokens with equal similarity come out in the
// order this vocabulary yields them. Entries are therefore
// kept in a Vec (insertion order) with a HashMap index on the
// side for O(1) lookup.
//
// Reference: Rust Book §8 (Hash Maps)

use std::collections::HashMap;

use crate::error::{EncoderError, Result};

/// Placeholder used for masked-token prediction.
pub const MASK_TOKEN: &str = "<MASK>";

/// Placeholder for out-of-vocabulary words.
pub const UNK_TOKEN: &str = "<UNK>";

/// Ordered token → embedding-row mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    /// (token, row) pairs in iteration order
    entries:  Vec<(String, usize)>,
    /// token → position in `entries`
    position: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, keeping the order they arrive in.
    pub fn from_pairs<S, I>(pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, usize)>,
    {
        let mut vocab = Self::new();
        for (token, row) in pairs {
            vocab.insert(token, row);
        }
        vocab
    }

    /// Build from an unordered map. Entries are ordered by row
    /// index (ties by token) so the result is deterministic.
    pub fn from_index_map(map: HashMap<String, usize>) -> Self {
        let mut pairs: Vec<(String, usize)> = map.into_iter().collect();
        pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Self::from_pairs(pairs)
    }

    /// Insert a token. Re-inserting an existing token updates its
    /// row but keeps its original position.
    pub fn insert(&mut self, token: impl Into<String>, row: usize) {
        let token = token.into();
        match self.position.get(&token) {
            Some(&pos) => self.entries[pos].1 = row,
            None => {
                self.position.insert(token.clone(), self.entries.len());
                self.entries.push((token, row));
            }
        }
    }

    /// Exact (case-sensitive) lookup.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.position.get(token).map(|&pos| self.entries[pos].1)
    }

    /// Case-insensitive lookup: the query is lower-cased first.
    /// Fails with `TokenNotFound` naming the lower-cased token.
    pub fn lookup(&self, token: &str) -> Result<usize> {
        let key = token.to_lowercase();
        self.get(&key).ok_or(EncoderError::TokenNotFound(key))
    }

    /// Iterate `(token, row)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(t, r)| (t.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest row index referenced, if any.
    pub fn max_row(&self) -> Option<usize> {
        self.entries.iter().map(|(_, r)| *r).max()
    }

    pub fn to_index_map(&self) -> HashMap<String, usize> {
        self.entries.iter().cloned().collect()
    }
}

/// True for the placeholder tokens that never take part in
/// neighbour ranking.
pub fn is_reserved(token: &str) -> bool {
    token == MASK_TOKEN || token == UNK_TOKEN
}
