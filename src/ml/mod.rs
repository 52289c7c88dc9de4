// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn-specific encoder code.
//
// What's in this layer:
//
//   mask.rs       — PaddingMask: which positions are real tokens
//
//   sublayer.rs   — AttentionModule / FeedForwardModule traits
//                  and their impls for Burn's MultiHeadAttention
//                  and PositionWiseFeedForward
//
//   residual.rs   — ResidualNorm: Norm(x + Dropout(f(x)))
//
//   norm.rs       — Standardize: affine-free final normalization
//
//   encoder.rs    — EncoderBlock and EncoderStack
//                  • self-attention + feed-forward per block
//                  • N independently initialised blocks
//                  • shared padding mask across blocks
//
//   similarity.rs — rank_neighbors: cosine-similarity ranking
//                  over an embedding table
//
//   seed.rs       — seed_everywhere: one-call reproducibility
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

/// Padding mask shared by every block
pub mod mask;

/// Attention and feed-forward capabilities
pub mod sublayer;

/// Residual + dropout + layer-norm wrapper
pub mod residual;

/// Parameter-free standardization
pub mod norm;

/// Encoder block and stack
pub mod encoder;

/// Nearest neighbours in embedding space
pub mod similarity;

/// Backend and host RNG seeding
pub mod seed;
