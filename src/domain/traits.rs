// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for a vocabulary without caring
// where it comes from: VocabularyStore reads either vocab.json
// or a HuggingFace tokenizer.json behind this one method.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::vocabulary::Vocabulary;

// ─── VocabularySource ─────────────────────────────────────────────────────────
/// Any component that can produce a token → embedding-row mapping.
pub trait VocabularySource {
    fn load_vocabulary(&self) -> Result<Vocabulary>;
}

