// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File persistence used by the application layer:
//
//   checkpoint.rs  — Saving and loading encoder weights and
//                    embedding tables with Burn's
//                    CompactRecorder, plus the RunConfig as
//                    JSON so a stack can be rebuilt before its
//                    weights are loaded.
//
//   vocab_store.rs — Vocabulary persistence
//                    Reads a HuggingFace tokenizer.json or a
//                    plain vocab.json, and writes vocab.json.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Encoder, embedding and config persistence
pub mod checkpoint;

/// Vocabulary loading and saving
pub mod vocab_store;
