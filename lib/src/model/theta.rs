use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::model::ParamOps;

/// Parameter vector of a linear predictor: one intercept plus one
/// coefficient per feature column.
///
/// When flattened (see [`Theta::to_vec`]) the layout is
/// `[intercept, coefficient_1, …, coefficient_n]`, so index 0 is always the
/// intercept and index `i >= 1` maps to feature column `i - 1`.
///
/// Gradients share this type: the gradient of the cost with respect to the
/// intercept sits where the intercept does.
///
/// ```
/// use batch_descent::backend::CpuBackend;
/// use batch_descent::model::Theta;
///
/// let theta = Theta::<CpuBackend>::from_slice(&[0.5, 1.0, -2.0]).unwrap();
/// assert_eq!(theta.n_features(), 2);
/// assert_eq!(theta.intercept(), 0.5);
/// assert_eq!(theta.to_vec(), vec![0.5, 1.0, -2.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Theta<B: Backend> {
    pub intercept: Scalar<B>,
    pub coefficients: Tensor1D<B>,
}

impl<B: Backend> Theta<B> {
    /// Builds a parameter vector from an intercept and coefficients.
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept: Scalar::new(intercept),
            coefficients: Tensor1D::new(coefficients),
        }
    }

    /// All-zero parameters for `n_features` feature columns.
    pub fn zeros(n_features: usize) -> Self {
        Self {
            intercept: Scalar::new(0.0),
            coefficients: Tensor1D::zeros(n_features),
        }
    }

    /// Rebuilds parameters from the flattened `[intercept, coefficients…]`
    /// layout. Returns `None` for an empty slice.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let (intercept, coefficients) = values.split_first()?;
        Some(Self::new(*intercept, coefficients.to_vec()))
    }

    pub fn intercept(&self) -> f64 {
        self.intercept.to_f64()
    }

    pub fn coefficients(&self) -> &Tensor1D<B> {
        &self.coefficients
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Number of parameters, intercept included.
    pub fn len(&self) -> usize {
        self.n_features() + 1
    }

    /// Always `false`: there is at least the intercept.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Reads parameter `i` in flattened order.
    ///
    /// # Panics
    /// If `i >= self.len()`.
    pub fn get(&self, i: usize) -> f64 {
        match i {
            0 => self.intercept(),
            _ => self.coefficients.get(i - 1),
        }
    }

    /// Copies the parameters to the host in flattened order.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len());
        out.push(self.intercept());
        out.extend(self.coefficients.to_vec());
        out
    }

    /// Linear predictor for every row: `features @ coefficients + intercept`.
    ///
    /// # Panics
    /// If the number of feature columns differs from [`Theta::n_features`].
    pub fn linear_combination(&self, features: &Tensor2D<B>) -> Tensor1D<B> {
        features.dot(&self.coefficients).add_scalar(&self.intercept)
    }

    /// `maxᵢ |selfᵢ - otherᵢ|` over the flattened layout.
    ///
    /// A NaN anywhere makes the result NaN, which never satisfies a
    /// `<= tolerance` convergence test.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        let intercept_delta = (self.intercept - other.intercept).abs().to_f64();
        let coefficient_delta = self
            .coefficients
            .sub(&other.coefficients)
            .abs()
            .max()
            .to_f64();
        if intercept_delta.is_nan() || coefficient_delta.is_nan() {
            f64::NAN
        } else {
            intercept_delta.max(coefficient_delta)
        }
    }

    /// `true` when every parameter is finite.
    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.is_finite()
    }
}

impl<B: Backend> ParamOps<B> for Theta<B> {
    fn add(&self, other: &Self) -> Self {
        Self {
            intercept: self.intercept + other.intercept,
            coefficients: self.coefficients.add(&other.coefficients),
        }
    }

    fn scale(&self, scalar: Scalar<B>) -> Self {
        Self {
            intercept: self.intercept * scalar,
            coefficients: self.coefficients.scale(&scalar),
        }
    }
}
