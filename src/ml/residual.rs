// ============================================================
// Layer 5 — Residual + Dropout + Norm Wrapper
// ============================================================
// Wraps an arbitrary sublayer f:
//
//   output = Norm(x + Dropout(f(x)))
//
// The wrapper does not know whether f is self-attention or a
// feed-forward network; the encoder block passes either one in
// as a closure. Each block owns two independent wrappers.
//
// Dropout runs only in training mode, which in Burn means an
// autodiff backend. On an inference backend it is a no-op.
//
// The residual add never broadcasts: f(x) must come back with
// exactly the shape of x.
//
// Reference: Vaswani et al. (2017) §5.4 (Residual Dropout)
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig, LayerNorm, LayerNormConfig},
    prelude::*,
};

use crate::error::{self, EncoderError};

#[derive(Config, Debug)]
pub struct ResidualNormConfig {
    /// Feature dimension of the wrapped tensor (d_model).
    pub size: usize,
    /// Drop probability applied to the sublayer output.
    #[config(default = 0.1)]
    pub dropout: f64,
    /// When false the normalization step is the identity.
    #[config(default = true)]
    pub normalize: bool,
    #[config(default = 1e-5)]
    pub epsilon: f64,
}

impl ResidualNormConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<ResidualNorm<B>> {
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(EncoderError::InvalidConfig(format!(
                "dropout probability must be in [0, 1), got {}",
                self.dropout
            )));
        }

        let norm = self.normalize.then(|| {
            LayerNormConfig::new(self.size)
                .with_epsilon(self.epsilon)
                .init(device)
        });

        Ok(ResidualNorm {
            norm,
            dropout: DropoutConfig::new(self.dropout).init(),
            size:    self.size,
        })
    }
}

#[derive(Module, Debug)]
pub struct ResidualNorm<B: Backend> {
    pub norm:    Option<LayerNorm<B>>,
    pub dropout: Dropout,
    pub size:    usize,
}

impl<B: Backend> ResidualNorm<B> {
    /// Apply `sublayer` to `x` and fold the result back into `x`.
    ///
    /// Fails with `ShapeMismatch` if the sublayer changes the
    /// shape, or if the feature dimension differs from `size`.
    pub fn forward<const D: usize, F>(
        &self,
        x:        Tensor<B, D>,
        sublayer: F,
    ) -> error::Result<Tensor<B, D>>
    where
        F: FnOnce(Tensor<B, D>) -> Tensor<B, D>,
    {
        let dims = x.dims();
        if dims[D - 1] != self.size {
            return Err(EncoderError::shape_mismatch(
                "residual input feature dimension",
                [self.size],
                [dims[D - 1]],
            ));
        }

        let out = sublayer(x.clone());
        if out.dims() != dims {
            return Err(EncoderError::shape_mismatch(
                "residual sublayer output",
                dims,
                out.dims(),
            ));
        }

        let summed = x + self.dropout.forward(out);
        Ok(match &self.norm {
            Some(norm) => norm.forward(summed),
            None       => summed,
        })
    }
}
