// ============================================================
// Layer 5 — Encoder Block and Encoder Stack (Burn)
// ============================================================
// The encoder half of the Transformer:
//
//   values ─► [EncoderBlock 1] ─► ... ─► [EncoderBlock N] ─► Standardize ─► output
//                  │
//                  ├─ ResidualNorm #1 around self-attention(x, x, x, mask)
//                  └─ ResidualNorm #2 around feed-forward(x)
//
// Every block keeps [batch, seq_len, size] in and out, and the
// same padding mask is handed to every block.
//
// Parameter independence:
//   A Burn module clone shares its ParamIds with the original,
//   so cloning one prototype block N times would tie all N
//   blocks together during optimisation. The stack is therefore
//   always built by calling a block factory N times, each call
//   allocating fresh parameters.
//
// Reference: Vaswani et al. (2017) §3.1 (Encoder and Decoder Stacks)
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        attention::{MultiHeadAttention, MultiHeadAttentionConfig},
        transformer::{PositionWiseFeedForward, PositionWiseFeedForwardConfig},
    },
    prelude::*,
};

use crate::error::{self, EncoderError};
use crate::ml::{
    mask::PaddingMask,
    norm::{Standardize, StandardizeConfig},
    residual::{ResidualNorm, ResidualNormConfig},
    sublayer::{AttentionModule, FeedForwardModule},
};

/// Block wired with Burn's multi-head attention and position-wise FFN.
pub type StandardEncoderBlock<B> =
    EncoderBlock<B, MultiHeadAttention<B>, PositionWiseFeedForward<B>>;

/// Stack of [`StandardEncoderBlock`]s.
pub type StandardEncoderStack<B> =
    EncoderStack<B, MultiHeadAttention<B>, PositionWiseFeedForward<B>>;

// ─── EncoderBlockConfig ───────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct EncoderBlockConfig {
    /// Model dimension (d_model); every token is a vector of this size
    pub size:      usize,
    /// Attention heads; must divide `size`
    pub num_heads: usize,
    /// Inner dimension of the feed-forward network
    pub d_ff:      usize,
    #[config(default = 0.1)]
    pub dropout:   f64,
    /// Layer-normalize inside the residual wrappers
    #[config(default = true)]
    pub normalize: bool,
}

impl EncoderBlockConfig {
    pub fn validate(&self) -> error::Result<()> {
        if self.size == 0 || self.num_heads == 0 || self.d_ff == 0 {
            return Err(EncoderError::InvalidConfig(format!(
                "size ({}), num_heads ({}) and d_ff ({}) must all be non-zero",
                self.size, self.num_heads, self.d_ff
            )));
        }
        if self.size % self.num_heads != 0 {
            return Err(EncoderError::InvalidConfig(format!(
                "size {} is not divisible by num_heads {}",
                self.size, self.num_heads
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(EncoderError::InvalidConfig(format!(
                "dropout probability must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }

    fn residual(&self) -> ResidualNormConfig {
        ResidualNormConfig::new(self.size)
            .with_dropout(self.dropout)
            .with_normalize(self.normalize)
    }

    /// Fresh block with Burn's attention and feed-forward modules.
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<StandardEncoderBlock<B>> {
        self.validate()?;

        let attention = MultiHeadAttentionConfig::new(self.size, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let feed_forward = PositionWiseFeedForwardConfig::new(self.size, self.d_ff)
            .with_dropout(self.dropout)
            .init(device);

        self.init_with(attention, feed_forward, device)
    }

    /// Fresh block around caller-supplied sublayers. The two
    /// residual wrappers are always newly allocated.
    pub fn init_with<B: Backend, A, F>(
        &self,
        attention:    A,
        feed_forward: F,
        device:       &B::Device,
    ) -> error::Result<EncoderBlock<B, A, F>> {
        self.validate()?;
        Ok(EncoderBlock {
            attention,
            attention_norm:    self.residual().init(device)?,
            feed_forward,
            feed_forward_norm: self.residual().init(device)?,
            size:              self.size,
        })
    }
}

// ─── EncoderBlock ─────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend, A, F> {
    pub attention:         A,
    pub attention_norm:    ResidualNorm<B>,
    pub feed_forward:      F,
    pub feed_forward_norm: ResidualNorm<B>,
    size:                  usize,
}

impl<B: Backend, A, F> EncoderBlock<B, A, F> {
    /// Model dimension this block was configured with.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<B, A, F> EncoderBlock<B, A, F>
where
    B: Backend,
    A: AttentionModule<B>,
    F: FeedForwardModule<B>,
{
    /// values: [batch, seq_len, size], mask: [batch, seq_len]
    /// → [batch, seq_len, size]
    pub fn forward(
        &self,
        values: Tensor<B, 3>,
        mask:   &PaddingMask<B>,
    ) -> error::Result<Tensor<B, 3>> {
        let [batch_size, seq_len, size] = values.dims();
        if size != self.size {
            return Err(EncoderError::shape_mismatch(
                "encoder block input",
                [batch_size, seq_len, self.size],
                [batch_size, seq_len, size],
            ));
        }
        mask.check_dims(batch_size, seq_len)?;

        // Self-attention: query, key and value are all x.
        let values = self.attention_norm.forward(values, |x| {
            self.attention.attend(x.clone(), x.clone(), x, mask)
        })?;

        self.feed_forward_norm
            .forward(values, |x| self.feed_forward.transform(x))
    }
}

// ─── EncoderStackConfig ───────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct EncoderStackConfig {
    /// Configuration shared by every block (not the weights)
    pub block:         EncoderBlockConfig,
    pub num_layers:    usize,
    /// Epsilon of the final, affine-free standardization
    #[config(default = 1e-5)]
    pub final_epsilon: f64,
}

impl EncoderStackConfig {
    /// N blocks, each with its own freshly initialised parameters.
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<StandardEncoderStack<B>> {
        self.init_with(|_| self.block.init(device))
    }

    /// N blocks from a factory called once per layer index.
    /// The factory must hand back a newly built block each time.
    pub fn init_with<B, A, F, M>(&self, make_block: M) -> error::Result<EncoderStack<B, A, F>>
    where
        B: Backend,
        M: FnMut(usize) -> error::Result<EncoderBlock<B, A, F>>,
    {
        if self.num_layers == 0 {
            return Err(EncoderError::InvalidConfig(
                "an encoder stack needs at least one layer".to_string(),
            ));
        }

        let layers = (0..self.num_layers)
            .map(make_block)
            .collect::<error::Result<Vec<_>>>()?;

        tracing::debug!(
            "Built encoder stack: {} layers, size={}",
            layers.len(),
            self.block.size
        );

        EncoderStack::from_blocks(
            layers,
            StandardizeConfig::new().with_epsilon(self.final_epsilon).init(),
        )
    }
}

// ─── EncoderStack ─────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct EncoderStack<B: Backend, A, F> {
    pub layers:     Vec<EncoderBlock<B, A, F>>,
    pub final_norm: Standardize,
    size:           usize,
}

impl<B: Backend, A, F> EncoderStack<B, A, F> {
    /// Assemble a stack from already-built blocks. The blocks must
    /// not share parameters; they must all have the same size.
    pub fn from_blocks(
        layers:     Vec<EncoderBlock<B, A, F>>,
        final_norm: Standardize,
    ) -> error::Result<Self> {
        let size = match layers.first() {
            Some(first) => first.size(),
            None => {
                return Err(EncoderError::InvalidConfig(
                    "an encoder stack needs at least one layer".to_string(),
                ))
            }
        };

        if let Some((idx, odd)) = layers.iter().enumerate().find(|(_, l)| l.size() != size) {
            return Err(EncoderError::InvalidConfig(format!(
                "layer {idx} has size {} but layer 0 has size {size}",
                odd.size()
            )));
        }

        Ok(Self { layers, final_norm, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl<B, A, F> EncoderStack<B, A, F>
where
    B: Backend,
    A: AttentionModule<B>,
    F: FeedForwardModule<B>,
{
    /// values: [batch, seq_len, size], mask: [batch, seq_len]
    /// → [batch, seq_len, size]
    pub fn forward(
        &self,
        values: Tensor<B, 3>,
        mask:   &PaddingMask<B>,
    ) -> error::Result<Tensor<B, 3>> {
        let mut x = values;
        for layer in &self.layers {
            x = layer.forward(x, mask)?;
        }
        Ok(self.final_norm.forward(x))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, module::Param, tensor::Distribution};
    use std::sync::{Arc, Mutex};

    type TestBackend = NdArray;

    fn small_block() -> EncoderBlockConfig {
        EncoderBlockConfig::new(8, 2, 16)
    }

    fn random_values(dims: [usize; 3]) -> Tensor<TestBackend, 3> {
        Tensor::random(dims, Distribution::Normal(0.0, 1.0), &Default::default())
    }

    /// Stands in for attention: returns the query unchanged and
    /// records the mask it was handed.
    #[derive(Debug, Clone, Default)]
    struct SpyAttention {
        seen: Arc<Mutex<Vec<Vec<bool>>>>,
    }

    impl<B: Backend> AttentionModule<B> for SpyAttention {
        fn attend(
            &self,
            query: Tensor<B, 3>,
            _key:  Tensor<B, 3>,
            _value: Tensor<B, 3>,
            mask:  &PaddingMask<B>,
        ) -> Tensor<B, 3> {
            let flags = mask.valid().into_data().to_vec::<bool>().unwrap();
            self.seen.lock().unwrap().push(flags);
            query
        }
    }

    #[test]
    fn test_block_preserves_shape() {
        let device = Default::default();
        let block = small_block().init::<TestBackend>(&device).unwrap();
        let mask = PaddingMask::from_lengths(&[4, 2], 4, &device).unwrap();

        let out = block.forward(random_values([2, 4, 8]), &mask).unwrap();
        assert_eq!(out.dims(), [2, 4, 8]);
        assert_eq!(block.size(), 8);
    }

    #[test]
    fn test_stack_preserves_shape() {
        let device = Default::default();
        let stack = EncoderStackConfig::new(small_block(), 3)
            .init::<TestBackend>(&device)
            .unwrap();
        let mask = PaddingMask::from_lengths(&[5, 5, 1], 5, &device).unwrap();

        let out = stack.forward(random_values([3, 5, 8]), &mask).unwrap();
        assert_eq!(out.dims(), [3, 5, 8]);
        assert_eq!(stack.num_layers(), 3);
        assert_eq!(stack.size(), 8);
    }

    #[test]
    fn test_stack_output_is_standardized() {
        let device = Default::default();
        let stack = EncoderStackConfig::new(small_block(), 2)
            .init::<TestBackend>(&device)
            .unwrap();
        let mask = PaddingMask::all_valid(1, 3, &device);

        let out = stack.forward(random_values([1, 3, 8]), &mask).unwrap();
        let (_, mean) = out.var_mean_bias(2);
        for m in mean.into_data().to_vec::<f32>().unwrap() {
            assert!(m.abs() < 1e-4);
        }
    }

    #[test]
    fn test_block_rejects_wrong_feature_size() {
        let device = Default::default();
        let block = small_block().init::<TestBackend>(&device).unwrap();
        let mask = PaddingMask::all_valid(1, 3, &device);

        let err = block.forward(random_values([1, 3, 6]), &mask).unwrap_err();
        assert_eq!(
            err,
            EncoderError::shape_mismatch("encoder block input", [1, 3, 8], [1, 3, 6])
        );
    }

    #[test]
    fn test_block_rejects_mismatched_mask() {
        let device = Default::default();
        let block = small_block().init::<TestBackend>(&device).unwrap();
        let mask = PaddingMask::all_valid(1, 4, &device);

        let err = block.forward(random_values([1, 3, 8]), &mask).unwrap_err();
        assert!(matches!(err, EncoderError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let device: <TestBackend as Backend>::Device = Default::default();

        let heads = EncoderBlockConfig::new(10, 3, 16).init::<TestBackend>(&device);
        assert!(matches!(heads, Err(EncoderError::InvalidConfig(_))));

        let empty = EncoderStackConfig::new(small_block(), 0).init::<TestBackend>(&device);
        assert!(matches!(empty, Err(EncoderError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_blocks_rejects_mixed_sizes() {
        let device = Default::default();
        let a = small_block().init::<TestBackend>(&device).unwrap();
        let b = EncoderBlockConfig::new(4, 2, 8).init::<TestBackend>(&device).unwrap();

        let result = EncoderStack::from_blocks(vec![a, b], StandardizeConfig::new().init());
        assert!(matches!(result, Err(EncoderError::InvalidConfig(_))));
    }

    #[test]
    fn test_layers_have_independent_parameters() {
        let device = Default::default();
        let stack = EncoderStackConfig::new(small_block(), 3)
            .init::<TestBackend>(&device)
            .unwrap();

        let ids: Vec<_> = stack
            .layers
            .iter()
            .map(|l| l.attention.query.weight.id)
            .collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);

        let w0 = stack.layers[0].attention.query.weight.val().into_data();
        let w1 = stack.layers[1].attention.query.weight.val().into_data();
        assert_ne!(w0, w1);
    }

    #[test]
    fn test_mutating_one_layer_leaves_others_untouched() {
        let device = Default::default();
        let mut stack = EncoderStackConfig::new(small_block(), 2)
            .init::<TestBackend>(&device)
            .unwrap();
        let mask = PaddingMask::all_valid(1, 3, &device);
        let probe = random_values([1, 3, 8]);

        let weight_before = stack.layers[1].feed_forward.linear_inner.weight.val().into_data();
        let output_before = stack.layers[1].forward(probe.clone(), &mask).unwrap().into_data();

        let dims = stack.layers[0].feed_forward.linear_inner.weight.val().dims();
        stack.layers[0].feed_forward.linear_inner.weight =
            Param::from_tensor(Tensor::zeros(dims, &device));

        let zeroed = stack.layers[0].feed_forward.linear_inner.weight.val();
        assert!(zeroed.into_data().to_vec::<f32>().unwrap().iter().all(|v| *v == 0.0));

        let weight_after = stack.layers[1].feed_forward.linear_inner.weight.val().into_data();
        let output_after = stack.layers[1].forward(probe, &mask).unwrap().into_data();
        assert_eq!(weight_before, weight_after);
        assert_eq!(output_before, output_after);
    }

    #[test]
    fn test_every_block_sees_the_same_mask() {
        let device = Default::default();
        let spy = SpyAttention::default();
        let config = small_block();

        let stack = EncoderStackConfig::new(config.clone(), 3)
            .init_with(|_| {
                let ff = PositionWiseFeedForwardConfig::new(8, 16).init::<TestBackend>(&device);
                config.init_with::<TestBackend, _, _>(spy.clone(), ff, &device)
            })
            .unwrap();

        // Last token of each sequence is padding.
        let mask = PaddingMask::from_lengths(&[2, 2], 3, &device).unwrap();
        let out = stack.forward(random_values([2, 3, 8]), &mask).unwrap();
        assert_eq!(out.dims(), [2, 3, 8]);

        let seen = spy.seen.lock().unwrap();
        let expected = vec![true, true, false, true, true, false];
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|flags| *flags == expected));
    }

    #[test]
    fn test_stack_config_survives_json_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("encoder_config.json");

        let config = EncoderStackConfig::new(
            EncoderBlockConfig::new(16, 4, 64).with_dropout(0.2).with_normalize(false),
            3,
        )
        .with_final_epsilon(1e-6);
        config.save(&path).unwrap();

        let loaded = EncoderStackConfig::load(&path).unwrap();
        assert_eq!(loaded.num_layers, 3);
        assert_eq!(loaded.final_epsilon, 1e-6);
        assert_eq!(loaded.block.size, 16);
        assert_eq!(loaded.block.num_heads, 4);
        assert_eq!(loaded.block.d_ff, 64);
        assert_eq!(loaded.block.dropout, 0.2);
        assert!(!loaded.block.normalize);

        let residual_path = tmp.path().join("residual_config.json");
        loaded.block.residual().save(&residual_path).unwrap();
        let residual = ResidualNormConfig::load(&residual_path).unwrap();
        assert_eq!(residual.size, 16);
        assert_eq!(residual.dropout, 0.2);
        assert!(!residual.normalize);
    }
}
