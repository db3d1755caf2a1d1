//! Gradient computation and the parameter update rule.
//!
//! Computing the gradient ([`compute_gradient`]) and applying it
//! ([`Optimizer::step`]) are separate so the trainer can check the gradient,
//! report progress and test convergence between the two.

use crate::backend::{Backend, Scalar};
use crate::model::{ParamOps, Theta};
use crate::problem::Hyperparameters;
use crate::regularizers::{Regularization, Regularizer};

mod gradient;

pub use gradient::compute_gradient;

/// Trait for gradient-based optimizers.
///
/// # Type Parameters
/// * `B`: computation backend implementing [`Backend`]
/// * `P`: parameter type (e.g., [`Theta`])
pub trait Optimizer<B: Backend, P> {
    /// Returns the updated parameters. Inputs are never mutated.
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Batch gradient descent with an optional L2 penalty.
///
/// ```text
/// theta'[0] = theta[0] - echelon * gradient[0]
/// theta'[i] = theta[i] - echelon * gradient[i] - echelon * lambda * theta[i] / n    (i >= 1, L2 only)
/// ```
///
/// The intercept is never regularized, and with [`Regularization::None`] the
/// update is exactly `theta - echelon * gradient`.
///
/// ```rust
/// use batch_descent::backend::CpuBackend;
/// use batch_descent::model::Theta;
/// use batch_descent::optimizer::{GradientDescent, Optimizer};
/// use batch_descent::regularizers::Regularization;
///
/// let gd = GradientDescent::<CpuBackend>::new(0.5, Regularization::None, 4);
/// let theta = Theta::new(1.0, vec![2.0]);
/// let grad = Theta::new(1.0, vec![-2.0]);
/// assert_eq!(gd.step(&theta, &grad).to_vec(), vec![0.5, 3.0]);
/// ```
#[derive(Clone, Debug)]
pub struct GradientDescent<B: Backend> {
    echelon: Scalar<B>,
    regularization: Regularization,
    n_observations: usize,
}

impl<B: Backend> GradientDescent<B> {
    /// # Arguments
    /// * `echelon`: learning rate
    /// * `regularization`: penalty applied to the coefficients
    /// * `n_observations`: dataset size the penalty is scaled by
    pub fn new(echelon: f64, regularization: Regularization, n_observations: usize) -> Self {
        Self {
            echelon: Scalar::new(echelon),
            regularization,
            n_observations,
        }
    }

    pub fn from_hyperparameters(hyperparameters: &Hyperparameters, n_observations: usize) -> Self {
        Self::new(
            hyperparameters.echelon(),
            hyperparameters.regularization(),
            n_observations,
        )
    }

    pub fn echelon(&self) -> f64 {
        self.echelon.to_f64()
    }

    pub fn regularization(&self) -> Regularization {
        self.regularization
    }
}

impl<B: Backend> Optimizer<B, Theta<B>> for GradientDescent<B> {
    fn step(&self, params: &Theta<B>, gradients: &Theta<B>) -> Theta<B> {
        // theta + (-echelon) * gradient
        let neg_echelon = Scalar::<B>::new(0.0) - self.echelon;
        let descended = params.add(&gradients.scale(neg_echelon));

        match self.regularization {
            Regularization::None => descended,
            Regularization::L2(_) => {
                let penalty = self.regularization.penalty_grad(params, self.n_observations);
                descended.add(&penalty.scale(neg_echelon))
            }
        }
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::regularizers::NO_REGULARIZATION;

    fn unregularized(theta: &[f64], grad: &[f64], echelon: f64) -> Vec<f64> {
        theta
            .iter()
            .zip(grad)
            .map(|(t, g)| t - echelon * g)
            .collect()
    }

    #[test]
    fn test_step_matches_formula() {
        let gd = GradientDescent::<CpuBackend>::new(0.1, Regularization::None, 10);
        let theta = Theta::new(1.0, vec![2.0, 3.0]);
        let grad = Theta::new(0.5, vec![1.0, -1.0]);

        let updated = gd.step(&theta, &grad).to_vec();
        assert_eq!(
            updated,
            unregularized(&[1.0, 2.0, 3.0], &[0.5, 1.0, -1.0], 0.1)
        );
    }

    #[test]
    fn test_sentinel_is_bit_identical_to_unregularized() {
        let reg = Regularization::from_lambda(NO_REGULARIZATION).unwrap();
        let gd = GradientDescent::<CpuBackend>::new(0.013, reg, 7);

        let theta_host = [0.3, -1.7, 2.9, 1e-3];
        let grad_host = [0.11, 4.2, -0.7, 1e5];
        let theta = Theta::from_slice(&theta_host).unwrap();
        let grad = Theta::from_slice(&grad_host).unwrap();

        let updated = gd.step(&theta, &grad).to_vec();
        let expected = unregularized(&theta_host, &grad_host, 0.013);
        for (u, e) in updated.iter().zip(&expected) {
            assert_eq!(u.to_bits(), e.to_bits());
        }
    }

    #[test]
    fn test_l2_leaves_intercept_and_shrinks_coefficients() {
        let n = 4;
        let plain = GradientDescent::<CpuBackend>::new(0.1, Regularization::None, n);
        let ridge = GradientDescent::<CpuBackend>::new(0.1, Regularization::L2(2.0), n);

        let theta = Theta::new(5.0, vec![1.0, -3.0]);
        let grad = Theta::new(0.5, vec![0.2, -0.2]);

        let a = plain.step(&theta, &grad);
        let b = ridge.step(&theta, &grad);

        assert_eq!(a.intercept(), b.intercept());

        // extra term: echelon * lambda * theta / n = 0.05 * theta
        let extra = [0.05, -0.15];
        for i in 0..2 {
            let plain_i = a.coefficients().get(i);
            let ridge_i = b.coefficients().get(i);
            assert!(ridge_i.abs() < plain_i.abs());
            assert!((plain_i - ridge_i - extra[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_lambda_matches_unregularized() {
        let plain = GradientDescent::<CpuBackend>::new(0.1, Regularization::None, 3);
        let ridge = GradientDescent::<CpuBackend>::new(0.1, Regularization::L2(0.0), 3);
        let theta = Theta::new(1.0, vec![2.0]);
        let grad = Theta::new(1.0, vec![1.0]);
        assert_eq!(
            plain.step(&theta, &grad).to_vec(),
            ridge.step(&theta, &grad).to_vec()
        );
    }

    #[test]
    fn test_from_hyperparameters() {
        let hp = Hyperparameters::new(0.25, 1.5).unwrap();
        let gd = GradientDescent::<CpuBackend>::from_hyperparameters(&hp, 8);
        assert_eq!(gd.echelon(), 0.25);
        assert_eq!(gd.regularization(), Regularization::L2(1.5));
    }

    #[test]
    fn test_step_does_not_mutate_inputs() {
        let gd = GradientDescent::<CpuBackend>::new(1.0, Regularization::L2(1.0), 1);
        let theta = Theta::new(1.0, vec![1.0]);
        let grad = Theta::new(1.0, vec![1.0]);
        let _ = gd.step(&theta, &grad);
        assert_eq!(theta.to_vec(), vec![1.0, 1.0]);
        assert_eq!(grad.to_vec(), vec![1.0, 1.0]);
    }
}
