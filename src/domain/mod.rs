// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits, no Burn types, no file I/O.
//
//   vocabulary.rs — ordered token → embedding-row mapping
//   neighbor.rs   — one (token, similarity) ranking entry
//   traits.rs     — VocabularySource abstraction
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod vocabulary;

pub mod neighbor;

pub mod traits;
