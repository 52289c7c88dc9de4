// ============================================================
// nlp-encoder — Transformer encoder stack on Burn
// ============================================================
// Layer map:
//
//   cli/          — Layer 1: clap commands (binary front end)
//   application/  — Layer 2: encode / neighbours workflows
//   domain/       — Layer 3: Vocabulary, Neighbor, traits
//   ml/           — Layer 5: encoder block + stack, masks,
//                            similarity ranking, seeding
//   infra/        — Layer 6: checkpoints and vocabulary files
//   error.rs      — typed errors of the library layers
//
// Reference: Rust Book §7 (Modules)

#![recursion_limit = "256"]

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use domain::{neighbor::Neighbor, vocabulary::Vocabulary};
pub use error::{EncoderError, Result};
pub use ml::{
    encoder::{
        EncoderBlock, EncoderBlockConfig, EncoderStack, EncoderStackConfig,
        StandardEncoderBlock, StandardEncoderStack,
    },
    mask::PaddingMask,
    residual::{ResidualNorm, ResidualNormConfig},
    seed::seed_everywhere,
    similarity::rank_neighbors,
};
