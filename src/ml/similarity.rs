// ============================================================
// Layer 5 — Embedding Similarity
// ============================================================
// Ranks vocabulary tokens by cosine similarity to a query
// token's embedding:
//
//   target ─► lower-case ─► vocabulary row ─► embedding row q
//   every other token t ─► row e_t ─► cos(q, e_t)
//   ─► sort descending (stable)
//
// The placeholder tokens and the target itself are skipped.
// Ties keep vocabulary iteration order. Neither the table nor
// the vocabulary is modified.
//
// Embedding table shape: [vocab_rows, embedding_dim]

use burn::{prelude::*, tensor::linalg::cosine_similarity};
use std::cmp::Ordering;

use crate::domain::{
    neighbor::Neighbor,
    vocabulary::{is_reserved, Vocabulary},
};
use crate::error::{EncoderError, Result};

/// Neighbours of `target_word`, most similar first.
pub fn rank_neighbors<B: Backend>(
    target_word: &str,
    vocabulary:  &Vocabulary,
    embeddings:  &Tensor<B, 2>,
) -> Result<Vec<Neighbor>> {
    let target = target_word.to_lowercase();
    let row    = vocabulary.lookup(&target)?;

    let [rows, dim] = embeddings.dims();
    if let Some(max_row) = vocabulary.max_row() {
        if max_row >= rows {
            return Err(EncoderError::shape_mismatch(
                "embedding table rows",
                [max_row + 1, dim],
                [rows, dim],
            ));
        }
    }

    let candidates: Vec<(&str, usize)> = vocabulary
        .iter()
        .filter(|(token, _)| !is_reserved(token) && *token != target)
        .collect();

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let device  = embeddings.device();
    let indices: Vec<i64> = candidates.iter().map(|(_, r)| *r as i64).collect();
    let indices = Tensor::<B, 1, Int>::from_data(
        TensorData::new(indices, [candidates.len()]),
        &device,
    );

    let others = embeddings.clone().select(0, indices);
    let query  = embeddings
        .clone()
        .slice([row..row + 1, 0..dim])
        .repeat_dim(0, candidates.len());

    // [n, 1]
    let scores = cosine_similarity(query, others, 1, None)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| EncoderError::TensorData(format!("{e:?}")))?;

    let mut neighbors: Vec<Neighbor> = candidates
        .iter()
        .zip(scores)
        .map(|((token, _), score)| Neighbor::new(*token, score))
        .collect();

    if neighbors.iter().any(|n| n.similarity.is_nan()) {
        tracing::warn!("Embedding table produced NaN similarities for '{}'", target);
    }

    // sort_by is stable
    neighbors.sort_by(most_similar_first);

    tracing::debug!("Ranked {} neighbours of '{}'", neighbors.len(), target);
    Ok(neighbors)
}

/// Descending by similarity; NaN scores sink to the end.
fn most_similar_first(a: &Neighbor, b: &Neighbor) -> Ordering {
    match (a.similarity.is_nan(), b.similarity.is_nan()) {
        (false, false) => b.similarity.total_cmp(&a.similarity),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}
