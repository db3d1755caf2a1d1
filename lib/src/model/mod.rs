//! Model parameters.
//!
//! The only model trained here is the linear predictor
//! `z = intercept + Σᵢ coefficientᵢ · xᵢ`, optionally passed through a link
//! function by the loss. Its parameters are carried by [`Theta`].

use crate::backend::{Backend, Scalar};

pub mod theta;

pub use theta::Theta;

/// Arithmetic on parameter sets, used by optimizers to combine parameters
/// with (scaled) gradients without knowing their layout.
pub trait ParamOps<B: Backend>: Sized {
    /// Element-wise sum of two parameter sets of the same shape.
    fn add(&self, other: &Self) -> Self;

    /// Multiplies every parameter by `scalar`.
    fn scale(&self, scalar: Scalar<B>) -> Self;

    /// `self - other`, element-wise.
    fn sub(&self, other: &Self) -> Self {
        self.add(&other.scale(Scalar::new(-1.0)))
    }
}
