// ============================================================
// Layer 5 — Padding Mask
// ============================================================
// Marks which sequence positions hold real tokens and which
// are filler, so self-attention never attends to padding.
//
// Convention here: `true` = real token, `false` = padding,
// matching the {1, 0} attention_mask a batcher produces.
// Burn's MultiHeadAttention wants the opposite (true = pad),
// so `padding()` flips it at the attention boundary.
//
// Built once per batch by the caller and handed read-only to
// every encoder block.
//
// Shape: [batch, seq_len]

use burn::prelude::*;

use crate::error::{EncoderError, Result};

#[derive(Debug, Clone)]
pub struct PaddingMask<B: Backend> {
    valid: Tensor<B, 2, Bool>,
}

impl<B: Backend> PaddingMask<B> {
    /// Wrap a boolean tensor where `true` marks a real token.
    pub fn new(valid: Tensor<B, 2, Bool>) -> Self {
        Self { valid }
    }

    /// From a {0, 1} integer attention mask: any non-zero entry
    /// is a real token.
    pub fn from_attention_mask(attention_mask: Tensor<B, 2, Int>) -> Self {
        Self::new(attention_mask.equal_elem(0).bool_not())
    }

    /// One row per sequence: the first `lengths[i]` positions are
    /// real, the rest padding.
    pub fn from_lengths(lengths: &[usize], seq_len: usize, device: &B::Device) -> Result<Self> {
        if let Some(&too_long) = lengths.iter().find(|&&len| len > seq_len) {
            return Err(EncoderError::InvalidConfig(format!(
                "sequence length {too_long} exceeds padded length {seq_len}"
            )));
        }

        let flags: Vec<bool> = lengths
            .iter()
            .flat_map(|&len| (0..seq_len).map(move |pos| pos < len))
            .collect();

        let data = TensorData::new(flags, [lengths.len(), seq_len]);
        Ok(Self::new(Tensor::<B, 2, Bool>::from_data(data, device)))
    }

    /// Every position is a real token.
    pub fn all_valid(batch_size: usize, seq_len: usize, device: &B::Device) -> Self {
        let zeros = Tensor::<B, 2, Int>::zeros([batch_size, seq_len], device);
        Self::new(zeros.equal_elem(0))
    }

    pub fn dims(&self) -> [usize; 2] {
        self.valid.dims()
    }

    /// `true` where the position holds a real token.
    pub fn valid(&self) -> Tensor<B, 2, Bool> {
        self.valid.clone()
    }

    /// `true` where the position is padding (Burn's mask_pad form).
    pub fn padding(&self) -> Tensor<B, 2, Bool> {
        self.valid.clone().bool_not()
    }

    /// Fails unless the mask is exactly `[batch_size, seq_len]`.
    /// The mask is never broadcast.
    pub fn check_dims(&self, batch_size: usize, seq_len: usize) -> Result<()> {
        let dims = self.dims();
        if dims != [batch_size, seq_len] {
            return Err(EncoderError::shape_mismatch(
                "padding mask",
                [batch_size, seq_len],
                dims,
            ));
        }
        Ok(())
    }
}
