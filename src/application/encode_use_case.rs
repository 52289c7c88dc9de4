// ============================================================
// Layer 2 — EncodeUseCase
// ============================================================
// Runs one batch through a freshly built encoder stack:
//
//   Step 1: Seed backend + host RNG     (Layer 5 - ml)
//   Step 2: Build the stack             (Layer 5 - ml)
//   Step 3: Build token embeddings      (Burn nn::Embedding)
//   Step 4: Draw a padded token batch   (host RNG)
//   Step 5: Forward pass with the mask  (Layer 5 - ml)
//   Step 6: Summarise the output
//   Step 7: Optionally save everything  (Layer 6 - infra)
//
// Reference: Burn Book §3 (Building Blocks)

use anyhow::{Context, Result};
use burn::{
    nn::{Embedding, EmbeddingConfig},
    prelude::*,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::{traits::VocabularySource, vocabulary::Vocabulary};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabularyStore};
use crate::ml::{
    encoder::{EncoderBlockConfig, EncoderStackConfig},
    mask::PaddingMask,
    seed::{seed_everywhere, DEFAULT_SEED},
};

// ─── Run Configuration ───────────────────────────────────────────────────────
// Every hyperparameter of an encode run. Saved next to the
// weights so the stack can be rebuilt for loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub checkpoint_dir: String,
    pub seed:           u64,
    pub batch_size:     usize,
    pub seq_len:        usize,
    pub vocab_size:     usize,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            seed:           DEFAULT_SEED,
            batch_size:     4,
            seq_len:        16,
            vocab_size:     1000,
            d_model:        512,
            num_heads:      8,
            num_layers:     6,
            d_ff:           2048,
            dropout:        0.1,
        }
    }
}

impl RunConfig {
    pub fn block_config(&self) -> EncoderBlockConfig {
        EncoderBlockConfig::new(self.d_model, self.num_heads, self.d_ff)
            .with_dropout(self.dropout)
    }

    pub fn stack_config(&self) -> EncoderStackConfig {
        EncoderStackConfig::new(self.block_config(), self.num_layers)
    }
}

// ─── EncodeReport ─────────────────────────────────────────────────────────────
/// What one encode run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub output_dims: [usize; 3],
    /// Real-token count of each sequence
    pub lengths:     Vec<usize>,
    pub mean:        f32,
    pub std:         f32,
}

// ─── EncodeUseCase ────────────────────────────────────────────────────────────
pub struct EncodeUseCase {
    config:    RunConfig,
    save:      bool,
    tokenizer: Option<PathBuf>,
}

impl EncodeUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config, save: false, tokenizer: None }
    }

    /// Write the stack, embeddings and config to the checkpoint
    /// directory after the forward pass.
    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    /// Size the embedding table from a tokenizer's vocabulary and
    /// save that vocabulary alongside it.
    pub fn with_tokenizer(mut self, path: Option<PathBuf>) -> Self {
        self.tokenizer = path;
        self
    }

    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<EncodeReport> {
        let mut cfg = self.config.clone();

        // ── Step 1: Seed ─────────────────────────────────────────────────────
        let mut rng = seed_everywhere::<B>(cfg.seed, device);

        let vocab = match &self.tokenizer {
            Some(path) => {
                let vocab = VocabularyStore::new(&cfg.checkpoint_dir)
                    .with_tokenizer(path)
                    .load_vocabulary()?;
                cfg.vocab_size = vocab.max_row().map_or(0, |r| r + 1);
                Some(vocab)
            }
            None => None,
        };

        if cfg.vocab_size == 0 || cfg.seq_len == 0 || cfg.batch_size == 0 {
            anyhow::bail!(
                "vocab_size ({}), seq_len ({}) and batch_size ({}) must all be non-zero",
                cfg.vocab_size, cfg.seq_len, cfg.batch_size
            );
        }

        // ── Step 2: Build the stack ──────────────────────────────────────────
        let stack = cfg
            .stack_config()
            .init::<B>(device)
            .context("Cannot build encoder stack")?;
        tracing::info!(
            "Encoder stack: {} layers, d_model={}, heads={}, d_ff={}, params={}",
            stack.num_layers(),
            cfg.d_model,
            cfg.num_heads,
            cfg.d_ff,
            stack.num_params()
        );

        // ── Step 3: Token embeddings ─────────────────────────────────────────
        let embedding: Embedding<B> = EmbeddingConfig::new(cfg.vocab_size, cfg.d_model).init(device);

        // ── Step 4: Random padded batch ──────────────────────────────────────
        // Every sequence keeps at least one real token; the
        // rest of its row is padding.
        let lengths: Vec<usize> = (0..cfg.batch_size)
            .map(|_| rng.gen_range(1..=cfg.seq_len))
            .collect();
        let ids: Vec<i64> = (0..cfg.batch_size * cfg.seq_len)
            .map(|_| rng.gen_range(0..cfg.vocab_size) as i64)
            .collect();

        let ids  = Tensor::<B, 2, Int>::from_data(
            TensorData::new(ids, [cfg.batch_size, cfg.seq_len]),
            device,
        );
        let mask = PaddingMask::from_lengths(&lengths, cfg.seq_len, device)?;
        tracing::debug!("Sequence lengths: {:?}", lengths);

        // ── Step 5: Forward pass ─────────────────────────────────────────────
        let output = stack.forward(embedding.forward(ids), &mask)?;

        // ── Step 6: Summary ──────────────────────────────────────────────────
        let output_dims = output.dims();
        let (var, mean) = output.flatten::<1>(0, 2).var_mean_bias(0);
        let mean: f32   = mean.into_scalar().elem();
        let std: f32    = var.into_scalar().elem::<f32>().sqrt();

        tracing::info!(
            "Output {:?} | mean {:.4} | std {:.4}",
            output_dims,
            mean,
            std
        );

        // ── Step 7: Save ─────────────────────────────────────────────────────
        if self.save {
            let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
            ckpt.save_config(&cfg)?;
            ckpt.save_encoder(&stack)?;
            ckpt.save_embeddings(&embedding.weight.val())?;

            let store = VocabularyStore::new(&cfg.checkpoint_dir);
            let vocab = vocab.unwrap_or_else(|| placeholder_vocabulary(cfg.vocab_size));
            store.save(&vocab)?;

            tracing::info!("Saved checkpoint to '{}'", ckpt.dir().display());
        }

        Ok(EncodeReport { output_dims, lengths, mean, std })
    }
}

/// `tok0`, `tok1`, ... for runs without a tokenizer.
fn placeholder_vocabulary(size: usize) -> Vocabulary {
    Vocabulary::from_pairs((0..size).map(|i| (format!("tok{i}"), i)))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny(dir: &std::path::Path) -> RunConfig {
        RunConfig {
            checkpoint_dir: dir.display().to_string(),
            batch_size:     3,
            seq_len:        5,
            vocab_size:     20,
            d_model:        8,
            num_heads:      2,
            num_layers:     2,
            d_ff:           16,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_encode_reports_shape_and_lengths() {
        let tmp = tempfile::tempdir().unwrap();
        let report = EncodeUseCase::new(tiny(tmp.path()))
            .execute::<TestBackend>(&Default::default())
            .unwrap();

        assert_eq!(report.output_dims, [3, 5, 8]);
        assert_eq!(report.lengths.len(), 3);
        assert!(report.lengths.iter().all(|&l| (1..=5).contains(&l)));
        // Final standardization: roughly zero mean, unit spread.
        assert!(report.mean.abs() < 1e-3);
        assert!((report.std - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_encode_with_save_writes_checkpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = tiny(tmp.path());
        EncodeUseCase::new(cfg.clone())
            .with_save(true)
            .execute::<TestBackend>(&Default::default())
            .unwrap();

        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        assert_eq!(ckpt.load_config().unwrap(), cfg);

        let table = ckpt.load_embeddings::<TestBackend>(&Default::default()).unwrap();
        assert_eq!(table.dims(), [20, 8]);

        let vocab = VocabularyStore::new(tmp.path()).load().unwrap();
        assert_eq!(vocab.len(), 20);
        assert_eq!(vocab.get("tok7"), Some(7));
    }

    #[test]
    fn test_invalid_heads_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = RunConfig { num_heads: 3, ..tiny(tmp.path()) };
        let err = EncodeUseCase::new(cfg)
            .execute::<TestBackend>(&Default::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("divisible"));
    }
}
