use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::error::{Error, Result};
use crate::loss::Loss;
use crate::model::Theta;

/// Batch gradient of the mean cost at `theta`.
///
/// Every observation is evaluated with the same `theta`, the contributions
/// are summed and divided once by `n_observations`:
///
/// ```text
/// z(j)        = dot(row(j), coefficients) + intercept
/// residual(j) = link(z(j)) - response(j)
/// gradient(0) = mean_j residual(j)                  (0 when fit_intercept is off)
/// gradient(i) = mean_j residual(j) * x(j, i - 1)    for i >= 1
/// ```
///
/// Regularization is not included; the optimizer adds its own term.
///
/// # Errors
/// - [`Error::ShapeMismatch`] if the buffers disagree on dimensions.
/// - [`Error::GradientComputationFailed`] if any component is not finite.
///   The reported iteration is 0; the trainer fills in the real one.
///
/// ```
/// use batch_descent::backend::{CpuBackend, Tensor1D, Tensor2D};
/// use batch_descent::loss::SquaredError;
/// use batch_descent::model::Theta;
/// use batch_descent::optimizer::compute_gradient;
///
/// let x = Tensor2D::<CpuBackend>::new(vec![1.0, 0.0, 0.0, 1.0], 2, 2);
/// let y = Tensor1D::new(vec![1.0, 1.0]);
/// let grad = compute_gradient(&x, &y, &Theta::zeros(2), &SquaredError, true).unwrap();
/// assert_eq!(grad.to_vec(), vec![-1.0, -0.5, -0.5]);
/// ```
pub fn compute_gradient<B, L>(
    features: &Tensor2D<B>,
    responses: &Tensor1D<B>,
    theta: &Theta<B>,
    loss: &L,
    fit_intercept: bool,
) -> Result<Theta<B>>
where
    B: Backend,
    L: Loss<B> + ?Sized,
{
    let (n_observations, n_features) = features.shape();
    check_len("responses", n_observations, responses.len())?;
    check_len("theta coefficients", n_features, theta.n_features())?;
    if n_observations == 0 {
        return Err(failure("no observations"));
    }

    let z = theta.linear_combination(features);
    let residuals = loss.residuals(&z, responses);

    let inv_n = Scalar::<B>::new(1.0 / n_observations as f64);
    let intercept = if fit_intercept {
        residuals.sum() * inv_n
    } else {
        Scalar::new(0.0)
    };
    let coefficients = features.tdot(&residuals).scale(&inv_n);

    let gradient = Theta {
        intercept,
        coefficients,
    };
    if !gradient.is_finite() {
        return Err(failure("non-finite gradient"));
    }
    Ok(gradient)
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::ShapeMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

fn failure(reason: &str) -> Error {
    Error::GradientComputationFailed {
        iteration: 0,
        reason: reason.to_owned(),
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::loss::{SigmoidLinked, SquaredError};

    fn toy() -> (Tensor2D<CpuBackend>, Tensor1D<CpuBackend>) {
        // X = [[1, 2],
        //      [3, 4],
        //      [5, 6]]
        let x = Tensor2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let y = Tensor1D::new(vec![1.0, 2.0, 3.0]);
        (x, y)
    }

    #[test]
    fn test_gradient_matches_hand_computation() {
        let (x, y) = toy();
        let theta = Theta::new(0.5, vec![1.0, -1.0]);

        // z = [-0.5, -0.5, -0.5], r = z - y = [-1.5, -2.5, -3.5]
        // g0 = -7.5 / 3 = -2.5
        // g1 = (-1.5 - 7.5 - 17.5) / 3 = -26.5 / 3
        // g2 = (-3.0 - 10.0 - 21.0) / 3 = -34 / 3
        let g = compute_gradient(&x, &y, &theta, &SquaredError, true).unwrap();
        let expected = [-2.5, -26.5 / 3.0, -34.0 / 3.0];
        for (got, want) in g.to_vec().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "expected {want}, got {got}");
        }
    }

    #[test]
    fn test_gradient_is_deterministic() {
        let (x, y) = toy();
        let theta = Theta::new(0.1, vec![0.2, 0.3]);

        let g1 = compute_gradient(&x, &y, &theta, &SquaredError, true).unwrap();
        let g2 = compute_gradient(&x, &y, &theta, &SquaredError, true).unwrap();
        assert_eq!(g1.to_vec(), g2.to_vec());
    }

    #[test]
    fn test_frozen_intercept_has_zero_gradient() {
        let (x, y) = toy();
        let g = compute_gradient(&x, &y, &Theta::zeros(2), &SquaredError, false).unwrap();
        assert_eq!(g.intercept(), 0.0);
        assert!(g.coefficients().to_vec().iter().all(|v| *v != 0.0));
    }

    #[test]
    fn test_sigmoid_linked_gradient_at_zero() {
        let x = Tensor2D::<CpuBackend>::new(vec![1.0, 0.0], 2, 1);
        let y = Tensor1D::new(vec![1.0, 0.0]);

        // residuals = [0.5 - 1, 0.5 - 0] = [-0.5, 0.5]
        let g = compute_gradient(&x, &y, &Theta::zeros(1), &SigmoidLinked, true).unwrap();
        assert_eq!(g.to_vec(), vec![0.0, -0.25]);
    }

    #[test]
    fn test_shape_mismatch() {
        let (x, y) = toy();
        let err = compute_gradient(&x, &y, &Theta::zeros(3), &SquaredError, true).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                what: "theta coefficients",
                expected: 2,
                got: 3
            }
        ));

        let short = Tensor1D::new(vec![1.0]);
        let err = compute_gradient(&x, &short, &Theta::zeros(2), &SquaredError, true).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { what: "responses", .. }));
    }

    #[test]
    fn test_non_finite_gradient_fails() {
        let (x, _) = toy();
        let y = Tensor1D::new(vec![1.0, f64::NAN, 3.0]);
        let err = compute_gradient(&x, &y, &Theta::zeros(2), &SquaredError, true).unwrap_err();
        assert!(matches!(err, Error::GradientComputationFailed { .. }));
    }
}
