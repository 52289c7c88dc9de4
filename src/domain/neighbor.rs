// ============================================================
// Layer 3 — Neighbor Domain Type
// ============================================================
// One entry of a nearest-neighbour ranking: a vocabulary
// token and its cosine similarity to the query token.
//
// Cosine similarity lives in [-1, 1]:
//    1.0 → same direction (synonym-like)
//    0.0 → orthogonal (unrelated)
//   -1.0 → opposite direction

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub token:      String,
    pub similarity: f32,
}

impl Neighbor {
    pub fn new(token: impl Into<String>, similarity: f32) -> Self {
        Self { token: token.into(), similarity }
    }
}

impl std::fmt::Display for Neighbor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<20} {:+.4}", self.token, self.similarity)
    }
}
