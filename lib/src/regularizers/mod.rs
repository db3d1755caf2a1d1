//! Weight penalties added to the cost.
//!
//! Regularization never touches the intercept. The strength `lambda` is
//! scaled by the number of observations, so the penalized cost is
//! `cost + (lambda / 2n) * Σ coefficient²` and the corresponding gradient
//! term for coefficient `i` is `lambda * coefficient_i / n`.

use crate::backend::{Backend, Scalar, Tensor1D};
use crate::error::{Error, Result};
use crate::model::Theta;

/// Sentinel `lambda` that disables regularization.
///
/// ```
/// use batch_descent::regularizers::{Regularization, NO_REGULARIZATION};
///
/// assert_eq!(Regularization::from_lambda(NO_REGULARIZATION).unwrap(), Regularization::None);
/// ```
pub const NO_REGULARIZATION: f64 = f64::INFINITY;

/// A penalty on the parameter vector.
pub trait Regularizer<B: Backend> {
    /// Penalty value added to the cost for reporting.
    fn penalty(&self, theta: &Theta<B>, n_observations: usize) -> Scalar<B>;

    /// Gradient of the penalty with respect to every parameter. The intercept
    /// entry is always zero.
    fn penalty_grad(&self, theta: &Theta<B>, n_observations: usize) -> Theta<B>;
}

/// Ridge penalty with strength `lambda`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L2 {
    pub lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }
}

impl<B: Backend> Regularizer<B> for L2 {
    fn penalty(&self, theta: &Theta<B>, n_observations: usize) -> Scalar<B> {
        let w = theta.coefficients();
        w.dot(w) * Scalar::new(self.lambda / (2.0 * n_observations as f64))
    }

    fn penalty_grad(&self, theta: &Theta<B>, n_observations: usize) -> Theta<B> {
        let factor = Scalar::new(self.lambda / n_observations as f64);
        Theta {
            intercept: Scalar::new(0.0),
            coefficients: theta.coefficients().scale(&factor),
        }
    }
}

/// No penalty at all.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoRegularizer;

impl<B: Backend> Regularizer<B> for NoRegularizer {
    fn penalty(&self, _theta: &Theta<B>, _n_observations: usize) -> Scalar<B> {
        Scalar::new(0.0)
    }

    fn penalty_grad(&self, theta: &Theta<B>, _n_observations: usize) -> Theta<B> {
        Theta {
            intercept: Scalar::new(0.0),
            coefficients: Tensor1D::zeros(theta.n_features()),
        }
    }
}

/// Regularization chosen for a session.
///
/// Stored instead of a raw `lambda` so the "no regularization" case does not
/// depend on an infinite float surviving serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Regularization {
    #[default]
    None,
    L2(f64),
}

impl Regularization {
    /// Maps a raw `lambda` to a regularization choice.
    ///
    /// [`NO_REGULARIZATION`] (`+inf`) selects [`Regularization::None`]; any
    /// other non-negative finite value selects L2. Negative and NaN values
    /// are rejected.
    pub fn from_lambda(lambda: f64) -> Result<Self> {
        if lambda == NO_REGULARIZATION {
            return Ok(Self::None);
        }
        if lambda.is_nan() || lambda < 0.0 {
            return Err(Error::InvalidHyperparameter {
                name: "lambda",
                value: lambda,
            });
        }
        Ok(Self::L2(lambda))
    }

    /// The raw `lambda`, with [`NO_REGULARIZATION`] for `None`.
    pub fn lambda(&self) -> f64 {
        match self {
            Self::None => NO_REGULARIZATION,
            Self::L2(lambda) => *lambda,
        }
    }

    /// Re-checks a value that bypassed [`Regularization::from_lambda`], e.g.
    /// one read from a config file.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::None => Ok(()),
            Self::L2(lambda) if lambda.is_finite() && *lambda >= 0.0 => Ok(()),
            Self::L2(lambda) => Err(Error::InvalidHyperparameter {
                name: "lambda",
                value: *lambda,
            }),
        }
    }
}

impl<B: Backend> Regularizer<B> for Regularization {
    fn penalty(&self, theta: &Theta<B>, n_observations: usize) -> Scalar<B> {
        match self {
            Self::None => NoRegularizer.penalty(theta, n_observations),
            Self::L2(lambda) => L2::new(*lambda).penalty(theta, n_observations),
        }
    }

    fn penalty_grad(&self, theta: &Theta<B>, n_observations: usize) -> Theta<B> {
        match self {
            Self::None => NoRegularizer.penalty_grad(theta, n_observations),
            Self::L2(lambda) => L2::new(*lambda).penalty_grad(theta, n_observations),
        }
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_from_lambda() {
        assert_eq!(
            Regularization::from_lambda(NO_REGULARIZATION).unwrap(),
            Regularization::None
        );
        assert_eq!(
            Regularization::from_lambda(0.5).unwrap(),
            Regularization::L2(0.5)
        );
        assert_eq!(
            Regularization::from_lambda(0.0).unwrap(),
            Regularization::L2(0.0)
        );
        assert!(matches!(
            Regularization::from_lambda(-1.0),
            Err(Error::InvalidHyperparameter { name: "lambda", .. })
        ));
        assert!(Regularization::from_lambda(f64::NAN).is_err());
        assert!(Regularization::from_lambda(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_lambda_round_trips_sentinel() {
        assert_eq!(Regularization::None.lambda(), NO_REGULARIZATION);
        assert_eq!(Regularization::L2(2.0).lambda(), 2.0);
        assert!(Regularization::L2(2.0).validate().is_ok());
        assert!(Regularization::L2(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_l2_skips_intercept() {
        let theta = Theta::<CpuBackend>::new(10.0, vec![1.0, -2.0]);
        let reg = L2::new(4.0);

        let grad = Regularizer::<CpuBackend>::penalty_grad(&reg, &theta, 2);
        // lambda / n * w = 2 * w
        assert_eq!(grad.to_vec(), vec![0.0, 2.0, -4.0]);

        // lambda / 2n * (1 + 4) = 1 * 5
        let penalty = Regularizer::<CpuBackend>::penalty(&reg, &theta, 2).to_f64();
        assert!((penalty - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_regularizer_is_zero() {
        let theta = Theta::<CpuBackend>::new(10.0, vec![1.0, -2.0]);
        let grad = Regularizer::<CpuBackend>::penalty_grad(&Regularization::None, &theta, 3);
        assert_eq!(grad.to_vec(), vec![0.0; 3]);
        assert_eq!(
            Regularizer::<CpuBackend>::penalty(&NoRegularizer, &theta, 3).to_f64(),
            0.0
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&Regularization::L2(0.25)).unwrap();
        assert_eq!(json, r#"{"l2":0.25}"#);
        let none: Regularization = serde_json::from_str(r#""none""#).unwrap();
        assert_eq!(none, Regularization::None);
    }
}
