// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores encoder weights and embedding tables
// using Burn's CompactRecorder.
//
// What gets saved:
//   1. encoder.mpk.gz     — every parameter of the EncoderStack
//   2. embeddings.mpk.gz  — the [vocab_rows, d_model] table used
//                           for neighbour ranking
//   3. run_config.json    — the hyperparameters, so the stack
//                           can be rebuilt before its weights
//                           are loaded into it
//
// Burn's CompactRecorder:
//   - Serialises parameters to MessagePack, half precision
//   - Compresses with gzip
//   - Loading fails if the architecture doesn't match
//
// File layout:
//   checkpoints/
//     encoder.mpk.gz
//     embeddings.mpk.gz
//     run_config.json
//     vocab.json          ← written by VocabularyStore
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    module::Param,
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::encode_use_case::RunConfig;
use crate::ml::encoder::EncoderStack;

const ENCODER_FILE:    &str = "encoder";
const EMBEDDINGS_FILE: &str = "embeddings";
const CONFIG_FILE:     &str = "run_config.json";

/// Manages the files of one checkpoint directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager for `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| {
            format!("Cannot create checkpoint directory '{}'", dir.display())
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save every parameter of the stack.
    pub fn save_encoder<B, A, F>(&self, stack: &EncoderStack<B, A, F>) -> Result<()>
    where
        B: Backend,
        EncoderStack<B, A, F>: Module<B>,
    {
        let path = self.dir.join(ENCODER_FILE);

        CompactRecorder::new()
            .record(stack.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save encoder to '{}'", path.display())
            })?;

        tracing::debug!("Saved encoder ({} layers) to '{}'", stack.num_layers(), path.display());
        Ok(())
    }

    /// Load saved weights into `stack`, which must have been built
    /// with the same configuration as the saved one.
    pub fn load_encoder<B, A, F>(
        &self,
        stack:  EncoderStack<B, A, F>,
        device: &B::Device,
    ) -> Result<EncoderStack<B, A, F>>
    where
        B: Backend,
        EncoderStack<B, A, F>: Module<B>,
    {
        let path = self.dir.join(ENCODER_FILE);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load encoder '{}'. Have you run 'encode --save' first?",
                    path.display())
            })?;

        tracing::info!("Loaded encoder from '{}'", path.display());
        Ok(stack.load_record(record))
    }

    /// Save an embedding table, shape [vocab_rows, d_model].
    pub fn save_embeddings<B: Backend>(&self, embeddings: &Tensor<B, 2>) -> Result<()> {
        let path  = self.dir.join(EMBEDDINGS_FILE);
        let table = Param::from_tensor(embeddings.clone());

        CompactRecorder::new()
            .record(table, path.clone())
            .with_context(|| {
                format!("Failed to save embeddings to '{}'", path.display())
            })?;

        tracing::debug!("Saved embedding table {:?} to '{}'", embeddings.dims(), path.display());
        Ok(())
    }

    pub fn load_embeddings<B: Backend>(&self, device: &B::Device) -> Result<Tensor<B, 2>> {
        let path = self.dir.join(EMBEDDINGS_FILE);

        let table: Param<Tensor<B, 2>> = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load embeddings '{}'. Have you run 'encode --save' first?",
                    path.display())
            })?;

        Ok(table.val())
    }

    /// Save the run configuration as pretty-printed JSON.
    pub fn save_config(&self, cfg: &RunConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<RunConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'encode --save' first.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }
}
