// ============================================================
// Layer 5 — Reproducibility
// ============================================================
// One explicit start-up call seeds every random source:
//
//   1. the Burn backend RNG (dropout masks, random init)
//   2. a rand StdRng returned to the caller for any
//      application-level draws (demo batches, shuffles)
//
// Device RNGs are covered by (1): Burn routes seeding through
// the backend, so Wgpu and NdArray are seeded the same way.
//
// The seed comes from configuration; nothing in the library
// seeds implicitly.

use burn::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

/// Seed the backend and return a matching general-purpose RNG.
pub fn seed_everywhere<B: Backend>(seed: u64, device: &B::Device) -> StdRng {
    B::seed(device, seed);
    tracing::debug!("Seeded backend and StdRng with {}", seed);
    StdRng::seed_from_u64(seed)
}
