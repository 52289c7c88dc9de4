// ============================================================
// Layer 5 — Affine-free Standardization
// ============================================================
// The final normalization of the encoder stack:
//
//   y = (x - mean(x)) / sqrt(var(x) + eps)
//
// computed over the feature (last) dimension. Unlike Burn's
// LayerNorm there is no learned scale or shift, and unlike a
// batch norm there are no running statistics: the module has
// no parameters at all, so every stack shares the same
// behaviour at training and inference time.

use burn::prelude::*;

#[derive(Config, Debug)]
pub struct StandardizeConfig {
    /// Added to the variance for numerical stability.
    #[config(default = 1e-5)]
    pub epsilon: f64,
}

#[derive(Module, Clone, Debug)]
pub struct Standardize {
    pub epsilon: f64,
}

impl StandardizeConfig {
    pub fn init(&self) -> Standardize {
        Standardize { epsilon: self.epsilon }
    }
}

impl Standardize {
    /// # Shapes
    /// - input:  `[..., size]`
    /// - output: `[..., size]`
    pub fn forward<B: Backend, const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        let (var, mean) = input.clone().var_mean_bias(D - 1);
        input.sub(mean).div(var.add_scalar(self.epsilon).sqrt())
    }
}
