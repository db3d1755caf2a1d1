use crate::backend::Backend;
use std::marker::PhantomData;

/// Scalar operations required by the numerical backends.
///
/// Implemented for the primitive float a backend stores (`f64` for both
/// shipped backends). Arithmetic comes from the standard operator traits;
/// `to_f64` bridges to host code.
///
/// # Example
/// ```
/// use batch_descent::backend::ScalarOps;
///
/// let x = -4.0f64;
/// assert_eq!(ScalarOps::abs(x), 4.0);
/// assert!(!ScalarOps::is_finite(f64::NAN));
/// ```
pub trait ScalarOps:
    Clone
    + Copy
    + Send
    + Sync
    + std::fmt::Debug
    + PartialOrd
    + std::ops::Add<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Div<Output = Self>
{
    fn abs(self) -> Self;
    fn to_f64(self) -> f64;
    fn is_finite(self) -> bool;
}

impl ScalarOps for f64 {
    fn abs(self) -> Self {
        f64::abs(self)
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

/// Backend-typed scalar.
///
/// Carries the originating backend as a phantom type so that values from
/// different backends cannot be mixed.
///
/// ```
/// use batch_descent::backend::{CpuBackend, Scalar};
///
/// let s: Scalar<CpuBackend> = Scalar::new(2.0);
/// assert_eq!((s * s).to_f64(), 4.0);
/// ```
#[derive(Clone, Debug, Copy)]
pub struct Scalar<B: Backend> {
    pub(crate) data: B::Scalar,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Scalar<B> {
    /// Creates a scalar from a host `f64`.
    pub fn new(f: f64) -> Self {
        Self {
            data: B::scalar_f64(f),
            backend: PhantomData,
        }
    }

    pub(crate) fn from_raw(data: B::Scalar) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Converts to a host `f64`.
    pub fn to_f64(&self) -> f64 {
        self.data.to_f64()
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(self.data.abs())
    }

    pub fn is_finite(&self) -> bool {
        self.data.is_finite()
    }
}

impl<B: Backend> std::ops::Add for Scalar<B> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.data + rhs.data)
    }
}

impl<B: Backend> std::ops::Sub for Scalar<B> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.data - rhs.data)
    }
}

impl<B: Backend> std::ops::Mul for Scalar<B> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_raw(self.data * rhs.data)
    }
}

impl<B: Backend> std::ops::Div for Scalar<B> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::from_raw(self.data / rhs.data)
    }
}
