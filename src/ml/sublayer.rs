// ============================================================
// Layer 5 — Sublayer Capabilities
// ============================================================
// An encoder block composes two sublayers it does not own the
// maths of:
//
//   AttentionModule   — attend(query, key, value, mask)
//   FeedForwardModule — transform(x), position-wise
//
// Burn supplies the production implementations
// (MultiHeadAttention, PositionWiseFeedForward). Keeping them
// behind traits lets a block run any attention variant, and
// lets tests swap in a recording stand-in.
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention},
        transformer::PositionWiseFeedForward,
    },
    prelude::*,
};

use crate::ml::mask::PaddingMask;

// ─── AttentionModule ──────────────────────────────────────────────────────────
/// Scaled dot-product attention over `[batch, seq_len, size]` inputs.
pub trait AttentionModule<B: Backend> {
    /// Returns the attention context, shape `[batch, seq_len_q, size]`.
    fn attend(
        &self,
        query: Tensor<B, 3>,
        key:   Tensor<B, 3>,
        value: Tensor<B, 3>,
        mask:  &PaddingMask<B>,
    ) -> Tensor<B, 3>;
}

impl<B: Backend> AttentionModule<B> for MultiHeadAttention<B> {
    fn attend(
        &self,
        query: Tensor<B, 3>,
        key:   Tensor<B, 3>,
        value: Tensor<B, 3>,
        mask:  &PaddingMask<B>,
    ) -> Tensor<B, 3> {
        let input = MhaInput::new(query, key, value).mask_pad(mask.padding());
        self.forward(input).context
    }
}

// ─── FeedForwardModule ────────────────────────────────────────────────────────
/// Position-wise transform; output has the input's shape.
pub trait FeedForwardModule<B: Backend> {
    fn transform(&self, x: Tensor<B, 3>) -> Tensor<B, 3>;
}

impl<B: Backend> FeedForwardModule<B> for PositionWiseFeedForward<B> {
    fn transform(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::NdArray,
        nn::{attention::MultiHeadAttentionConfig, transformer::PositionWiseFeedForwardConfig},
        tensor::Distribution,
    };

    type TestBackend = NdArray;

    #[test]
    fn test_multi_head_attention_keeps_shape() {
        let device = Default::default();
        let mha = MultiHeadAttentionConfig::new(8, 2).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([2, 5, 8], Distribution::Default, &device);
        let mask = PaddingMask::from_lengths(&[5, 3], 5, &device).unwrap();

        let out = mha.attend(x.clone(), x.clone(), x, &mask);
        assert_eq!(out.dims(), [2, 5, 8]);
    }

    #[test]
    fn test_padding_does_not_leak_into_real_positions() {
        // Changing the value at a padded position must leave the
        // attention output of the real positions untouched.
        let device = Default::default();
        let mha = MultiHeadAttentionConfig::new(4, 1)
            .with_dropout(0.0)
            .init::<TestBackend>(&device);
        let mask = PaddingMask::from_lengths(&[2], 3, &device).unwrap();

        let x = Tensor::<TestBackend, 3>::random([1, 3, 4], Distribution::Default, &device);
        let noise = Tensor::<TestBackend, 3>::random([1, 1, 4], Distribution::Default, &device);
        let y = x.clone().slice_assign([0..1, 2..3, 0..4], noise.mul_scalar(100.0));

        let out_x = mha.attend(x.clone(), x.clone(), x, &mask).slice([0..1, 0..2, 0..4]);
        let out_y = mha.attend(y.clone(), y.clone(), y, &mask).slice([0..1, 0..2, 0..4]);

        let a = out_x.into_data().to_vec::<f32>().unwrap();
        let b = out_y.into_data().to_vec::<f32>().unwrap();
        for (l, r) in a.iter().zip(b.iter()) {
            assert!((l - r).abs() < 1e-4, "{l} vs {r}");
        }
    }

    #[test]
    fn test_feed_forward_keeps_shape() {
        let device = Default::default();
        let ff = PositionWiseFeedForwardConfig::new(8, 32).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([3, 4, 8], Distribution::Default, &device);
        assert_eq!(ff.transform(x).dims(), [3, 4, 8]);
    }
}
