// ============================================================
// Layer 2 — NeighborsUseCase
// ============================================================
// Answers "which tokens sit closest to this word?":
//
//   Step 1: Load the vocabulary        (Layer 6 - infra)
//   Step 2: Load the embedding table   (Layer 6 - infra)
//   Step 3: Rank by cosine similarity  (Layer 5 - ml)
//   Step 4: Keep the top k
//
// Reference: Mikolov et al. (2013) word2vec nearest neighbours

use anyhow::{Context, Result};
use burn::prelude::*;
use std::path::PathBuf;

use crate::domain::{neighbor::Neighbor, traits::VocabularySource};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabularyStore};
use crate::ml::similarity::rank_neighbors;

pub struct NeighborsUseCase {
    checkpoint_dir: PathBuf,
    tokenizer:      Option<PathBuf>,
}

impl NeighborsUseCase {
    pub fn new(checkpoint_dir: impl Into<PathBuf>, tokenizer: Option<PathBuf>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into(), tokenizer }
    }

    /// The `top_k` nearest neighbours of `word`, most similar first.
    pub fn nearest<B: Backend>(
        &self,
        word:   &str,
        top_k:  usize,
        device: &B::Device,
    ) -> Result<Vec<Neighbor>> {
        // ── Step 1: Vocabulary ───────────────────────────────────────────────
        let mut store = VocabularyStore::new(&self.checkpoint_dir);
        if let Some(path) = &self.tokenizer {
            store = store.with_tokenizer(path);
        }
        let vocab = store.load_vocabulary()?;

        // ── Step 2: Embedding table ──────────────────────────────────────────
        let ckpt       = CheckpointManager::new(&self.checkpoint_dir)?;
        let embeddings = ckpt.load_embeddings::<B>(device)?;
        tracing::info!(
            "Vocabulary of {} tokens, embedding table {:?}",
            vocab.len(),
            embeddings.dims()
        );

        // ── Step 3 + 4: Rank and truncate ────────────────────────────────────
        let mut ranked = rank_neighbors(word, &vocab, &embeddings)
            .with_context(|| format!("Cannot rank neighbours of '{word}'"))?;
        ranked.truncate(top_k);

        Ok(ranked)
    }
}
