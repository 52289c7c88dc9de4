// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Loads and saves the token → embedding-row mapping.
//
// Two on-disk forms are understood:
//   1. tokenizer.json — a HuggingFace tokenizer; its vocabulary
//                       (added tokens included) is read through
//                       the `tokenizers` crate and ordered by id
//   2. vocab.json     — a flat {"token": row, ...} object in the
//                       checkpoint directory
//
// When a tokenizer path is configured it wins; otherwise
// vocab.json is read.
//
// Reference: HuggingFace tokenizers (Tokenizer::get_vocab)

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tokenizers::Tokenizer;

use crate::domain::{traits::VocabularySource, vocabulary::Vocabulary};

const VOCAB_FILE: &str = "vocab.json";

pub struct VocabularyStore {
    dir:       PathBuf,
    tokenizer: Option<PathBuf>,
}

impl VocabularyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), tokenizer: None }
    }

    /// Read the vocabulary from a HuggingFace tokenizer file instead
    /// of vocab.json.
    pub fn with_tokenizer(mut self, path: impl Into<PathBuf>) -> Self {
        self.tokenizer = Some(path.into());
        self
    }

    /// Vocabulary of a tokenizer.json, added tokens included.
    pub fn load_tokenizer(path: &Path) -> Result<Vocabulary> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))?;

        let map: HashMap<String, usize> = tokenizer
            .get_vocab(true)
            .into_iter()
            .map(|(token, id)| (token, id as usize))
            .collect();

        tracing::info!("Loaded {} tokens from '{}'", map.len(), path.display());
        Ok(Vocabulary::from_index_map(map))
    }

    /// Write `vocab` to {dir}/vocab.json.
    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Cannot create directory '{}'", self.dir.display())
        })?;

        let path = self.dir.join(VOCAB_FILE);
        let json = serde_json::to_string_pretty(&vocab.to_index_map())?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;

        tracing::debug!("Saved {} tokens to '{}'", vocab.len(), path.display());
        Ok(())
    }

    /// Read {dir}/vocab.json.
    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.dir.join(VOCAB_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read vocabulary from '{}'. \
                 Pass --tokenizer or run 'encode --save --tokenizer ...' first.",
                path.display()
            )
        })?;

        let map: HashMap<String, usize> = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary in '{}'", path.display()))?;

        Ok(Vocabulary::from_index_map(map))
    }
}

impl VocabularySource for VocabularyStore {
    fn load_vocabulary(&self) -> Result<Vocabulary> {
        match &self.tokenizer {
            Some(path) => Self::load_tokenizer(path),
            None       => self.load(),
        }
    }
}
