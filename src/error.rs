// ============================================================
// Typed Errors
// ============================================================
// Every failure the encoder core can raise. Nothing here is
// retried: a ShapeMismatch or TokenNotFound means the caller
// wired something up wrong, so it is surfaced immediately.
//
// The application and CLI layers wrap these in anyhow with
// extra context; the ml and domain layers return them as-is.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncoderError {
    /// Two tensors that must line up element for element do not.
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context:  String,
        expected: Vec<usize>,
        actual:   Vec<usize>,
    },

    /// The (lower-cased) token is not part of the vocabulary.
    #[error("key not found: token '{0}' is not in the vocabulary")]
    TokenNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tensor contents could not be read back to the host.
    #[error("tensor readback failed: {0}")]
    TensorData(String),
}

impl EncoderError {
    pub fn shape_mismatch(
        context:  impl Into<String>,
        expected: impl Into<Vec<usize>>,
        actual:   impl Into<Vec<usize>>,
    ) -> Self {
        Self::ShapeMismatch {
            context:  context.into(),
            expected: expected.into(),
            actual:   actual.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EncoderError>;
