use crate::error::{Error, Result};
use crate::regularizers::Regularization;

/// Default learning rate.
pub const DEFAULT_ECHELON: f64 = 1e-4;

/// Learning rate and regularization of one session.
///
/// Validated on construction and immutable afterwards: a session keeps the
/// values it was created with until it is destroyed.
///
/// ```
/// use batch_descent::problem::Hyperparameters;
/// use batch_descent::regularizers::{Regularization, NO_REGULARIZATION};
///
/// let hp = Hyperparameters::new(0.01, NO_REGULARIZATION).unwrap();
/// assert_eq!(hp.regularization(), Regularization::None);
/// assert!(Hyperparameters::new(0.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    echelon: f64,
    regularization: Regularization,
}

impl Hyperparameters {
    /// `lambda` follows [`Regularization::from_lambda`]: pass
    /// [`NO_REGULARIZATION`](crate::regularizers::NO_REGULARIZATION) to
    /// disable the penalty.
    pub fn new(echelon: f64, lambda: f64) -> Result<Self> {
        Self::with_regularization(echelon, Regularization::from_lambda(lambda)?)
    }

    pub fn with_regularization(echelon: f64, regularization: Regularization) -> Result<Self> {
        if !echelon.is_finite() || echelon <= 0.0 {
            return Err(Error::InvalidHyperparameter {
                name: "echelon",
                value: echelon,
            });
        }
        regularization.validate()?;
        Ok(Self {
            echelon,
            regularization,
        })
    }

    pub fn echelon(&self) -> f64 {
        self.echelon
    }

    pub fn regularization(&self) -> Regularization {
        self.regularization
    }

    /// Raw lambda, `+inf` when regularization is off.
    pub fn lambda(&self) -> f64 {
        self.regularization.lambda()
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            echelon: DEFAULT_ECHELON,
            regularization: Regularization::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regularizers::NO_REGULARIZATION;

    #[test]
    fn test_defaults() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.echelon(), 1e-4);
        assert_eq!(hp.lambda(), NO_REGULARIZATION);
    }

    #[test]
    fn test_rejects_bad_echelon() {
        for echelon in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    Hyperparameters::new(echelon, NO_REGULARIZATION),
                    Err(Error::InvalidHyperparameter { name: "echelon", .. })
                ),
                "echelon {echelon} accepted"
            );
        }
    }

    #[test]
    fn test_lambda_validation() {
        assert_eq!(
            Hyperparameters::new(0.1, 2.0).unwrap().regularization(),
            Regularization::L2(2.0)
        );
        assert!(Hyperparameters::new(0.1, -2.0).is_err());
        assert!(Hyperparameters::with_regularization(0.1, Regularization::L2(f64::NAN)).is_err());
    }
}
