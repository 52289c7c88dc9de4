// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// user-facing goal (encoding a batch, ranking neighbours).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - File access goes through Layer 6
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Build a stack and run one padded batch through it
pub mod encode_use_case;

/// Nearest neighbours of a word in embedding space
pub mod neighbors_use_case;
