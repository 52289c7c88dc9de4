// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `encode` and `neighbors`, and
// all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, enums)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::encode_use_case::RunConfig;
use crate::ml::seed::DEFAULT_SEED;

/// Which Burn backend runs the tensors
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    /// NdArray on the CPU
    Cpu,
    /// Wgpu on the default GPU adapter
    Gpu,
}

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an encoder stack and run a random padded batch through it
    Encode(EncodeArgs),

    /// Rank the tokens closest to a word in embedding space
    Neighbors(NeighborsArgs),
}

/// All arguments for the `encode` command.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Directory to save the encoder, embeddings and config into
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Write the checkpoint after the forward pass
    #[arg(long)]
    pub save: bool,

    /// HuggingFace tokenizer.json; its vocabulary sizes the
    /// embedding table and is saved as vocab.json
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,

    /// Seed for the backend RNG and the random batch
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Sequences per batch
    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Padded sequence length
    #[arg(long, default_value_t = 16)]
    pub seq_len: usize,

    /// Rows of the embedding table (ignored with --tokenizer)
    #[arg(long, default_value_t = 1000)]
    pub vocab_size: usize,

    /// Hidden dimension of the encoder (d_model in the paper)
    #[arg(long, default_value_t = 512)]
    pub d_model: usize,

    /// Number of attention heads; d_model must be divisible by it
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder blocks
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 2048)]
    pub d_ff: usize,

    /// Dropout probability inside each residual wrapper
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,
}

/// Convert CLI EncodeArgs into the application-layer RunConfig.
/// The application layer never sees clap types.
impl From<&EncodeArgs> for RunConfig {
    fn from(a: &EncodeArgs) -> Self {
        RunConfig {
            checkpoint_dir: a.checkpoint_dir.clone(),
            seed:           a.seed,
            batch_size:     a.batch_size,
            seq_len:        a.seq_len,
            vocab_size:     a.vocab_size,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
        }
    }
}

/// All arguments for the `neighbors` command
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Word to find neighbours for (case-insensitive)
    #[arg(long)]
    pub word: String,

    /// How many neighbours to print
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    /// Directory written by `encode --save`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Read the vocabulary from this tokenizer.json instead of vocab.json
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,
}
