//! Cost functions for batch gradient descent.
//!
//! Both losses here are paired with a linear predictor
//! `z = intercept + features @ coefficients`. Their common trait exposes the
//! link applied to `z` and the per-observation residual
//! `link(z) - response`, which is all the gradient needs: for either loss the
//! partial derivative of the mean cost with respect to a parameter is the
//! mean of `residual * feature`.

use crate::backend::{Backend, Scalar, Tensor1D};

/// A differentiable cost over a linear predictor.
///
/// Implementors define the link function and the scalar cost used for
/// progress reporting. The residual has a default implementation that holds
/// for every canonical link.
pub trait Loss<B: Backend> {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Maps the linear predictor to a prediction.
    fn link(&self, z: &Tensor1D<B>) -> Tensor1D<B>;

    /// Mean cost over all observations (for logging/metrics).
    fn loss(&self, z: &Tensor1D<B>, responses: &Tensor1D<B>) -> Scalar<B>;

    /// `link(z) - response` for every observation.
    fn residuals(&self, z: &Tensor1D<B>, responses: &Tensor1D<B>) -> Tensor1D<B> {
        self.link(z).sub(responses)
    }
}

/// Squared error with the identity link: `L = (1/2n) * Σ(z_j - y_j)^2`.
///
/// The factor 1/2 makes the gradient the plain mean of `residual * feature`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl<B: Backend> Loss<B> for SquaredError {
    fn name(&self) -> &'static str {
        "squared_error"
    }

    fn link(&self, z: &Tensor1D<B>) -> Tensor1D<B> {
        z.clone()
    }

    fn loss(&self, z: &Tensor1D<B>, responses: &Tensor1D<B>) -> Scalar<B> {
        let diff = z.sub(responses);
        diff.dot(&diff) / Scalar::new(2.0 * diff.len() as f64)
    }

    fn residuals(&self, z: &Tensor1D<B>, responses: &Tensor1D<B>) -> Tensor1D<B> {
        z.sub(responses)
    }
}

/// Logistic loss: the linear predictor goes through a sigmoid.
///
/// Cost is the mean binary cross-entropy, computed in the stable form
/// `max(z, 0) - z * y + log(1 + exp(-|z|))`. Responses are expected in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigmoidLinked;

impl<B: Backend> Loss<B> for SigmoidLinked {
    fn name(&self) -> &'static str {
        "sigmoid_cross_entropy"
    }

    fn link(&self, z: &Tensor1D<B>) -> Tensor1D<B> {
        z.sigmoid()
    }

    fn loss(&self, z: &Tensor1D<B>, responses: &Tensor1D<B>) -> Scalar<B> {
        let positive_part = z.maximum(&Tensor1D::zeros(z.len()));
        let log_term = z
            .abs()
            .scale(&Scalar::new(-1.0))
            .exp()
            .add_scalar(&Scalar::new(1.0))
            .log();
        positive_part.sub(&z.mul(responses)).add(&log_term).mean()
    }
}
