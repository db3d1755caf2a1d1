use super::scalar::Scalar;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed 1D tensor.
///
/// Wraps the backend's native vector (`B::Tensor1D`) and tags it with the
/// backend as a phantom type, so tensors from different backends cannot be
/// combined. All operations delegate to the backend.
///
/// # Example
/// ```
/// use batch_descent::backend::{CpuBackend, Scalar, Tensor1D};
///
/// let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
/// let y = x.scale(&Scalar::new(2.0));
/// assert_eq!(y.to_vec(), vec![2.0, 4.0, 6.0]);
/// ```
#[derive(Clone)]
pub struct Tensor1D<B: Backend> {
    pub(crate) data: B::Tensor1D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> std::fmt::Debug for Tensor1D<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tensor1D").field(&self.to_vec()).finish()
    }
}

impl<B: Backend> Tensor1D<B> {
    /// Creates a tensor from host values.
    pub fn new(data: Vec<f64>) -> Self {
        Self::from_raw(B::from_vec_1d(data))
    }

    /// Creates a tensor of `len` zeros.
    ///
    /// ```
    /// use batch_descent::backend::{CpuBackend, Tensor1D};
    ///
    /// let zeros: Tensor1D<CpuBackend> = Tensor1D::zeros(4);
    /// assert_eq!(zeros.to_vec(), vec![0.0; 4]);
    /// ```
    pub fn zeros(len: usize) -> Self {
        Self::from_raw(B::zeros_1d(len))
    }

    pub(crate) fn from_raw(data: B::Tensor1D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        B::len_1d(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads element `i`.
    ///
    /// # Panics
    /// If `i >= self.len()`.
    pub fn get(&self, i: usize) -> f64 {
        Scalar::<B>::from_raw(B::get_1d(&self.data, i)).to_f64()
    }

    /// Writes element `i`.
    ///
    /// # Panics
    /// If `i >= self.len()`.
    pub fn set(&mut self, i: usize, value: f64) {
        B::set_1d(&mut self.data, i, B::scalar_f64(value));
    }

    /// Copies the tensor to a host `Vec<f64>`.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_1d(&self.data)
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::from_raw(B::add_1d(&self.data, &other.data))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::from_raw(B::sub_1d(&self.data, &other.data))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::from_raw(B::mul_1d(&self.data, &other.data))
    }

    pub fn scale(&self, a: &Scalar<B>) -> Self {
        Self::from_raw(B::mul_scalar_1d(&self.data, &a.data))
    }

    pub fn add_scalar(&self, a: &Scalar<B>) -> Self {
        Self::from_raw(B::add_scalar_1d(&self.data, &a.data))
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(B::abs_1d(&self.data))
    }

    pub fn exp(&self) -> Self {
        Self::from_raw(B::exp_1d(&self.data))
    }

    pub fn log(&self) -> Self {
        Self::from_raw(B::log_1d(&self.data))
    }

    pub fn maximum(&self, other: &Self) -> Self {
        Self::from_raw(B::maximum_1d(&self.data, &other.data))
    }

    /// Element-wise logistic function.
    pub fn sigmoid(&self) -> Self {
        Self::from_raw(B::sigmoid_1d(&self.data))
    }

    /// `Σᵢ aᵢ * bᵢ`.
    ///
    /// ```
    /// use batch_descent::backend::{CpuBackend, Tensor1D};
    ///
    /// let a = Tensor1D::<CpuBackend>::new(vec![1.0, 2.0, 3.0]);
    /// let b = Tensor1D::<CpuBackend>::new(vec![4.0, 5.0, 6.0]);
    /// assert_eq!(a.dot(&b).to_f64(), 32.0);
    /// ```
    pub fn dot(&self, other: &Self) -> Scalar<B> {
        let prod = B::mul_1d(&self.data, &other.data);
        Scalar::from_raw(B::sum_all_1d(&prod))
    }

    pub fn sum(&self) -> Scalar<B> {
        Scalar::from_raw(B::sum_all_1d(&self.data))
    }

    pub fn mean(&self) -> Scalar<B> {
        Scalar::from_raw(B::mean_all_1d(&self.data))
    }

    pub fn max(&self) -> Scalar<B> {
        Scalar::from_raw(B::max_all_1d(&self.data))
    }

    /// `true` when every element is finite.
    pub fn is_finite(&self) -> bool {
        B::all_finite_1d(&self.data)
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_tensor1d_elementwise() {
        let a = Tensor1D::<CpuBackend>::new(vec![5.0, 7.0, 9.0]);
        let b = Tensor1D::<CpuBackend>::new(vec![2.0, 3.0, 4.0]);

        assert_eq!(a.sub(&b).to_vec(), vec![3.0, 4.0, 5.0]);
        assert_eq!(a.add(&b).to_vec(), vec![7.0, 10.0, 13.0]);
        assert_eq!(a.mul(&b).to_vec(), vec![10.0, 21.0, 36.0]);
        assert_eq!(
            b.add_scalar(&Scalar::new(-2.0)).to_vec(),
            vec![0.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_tensor1d_get_set() {
        let mut t = Tensor1D::<CpuBackend>::zeros(3);
        t.set(1, 2.5);
        assert_eq!(t.get(1), 2.5);
        assert_eq!(t.to_vec(), vec![0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_tensor1d_reductions() {
        let t = Tensor1D::<CpuBackend>::new(vec![1.0, -4.0, 2.0, 3.0]);
        assert_eq!(t.sum().to_f64(), 2.0);
        assert!((t.mean().to_f64() - 0.5).abs() < 1e-12);
        assert_eq!(t.max().to_f64(), 3.0);
        assert_eq!(t.abs().max().to_f64(), 4.0);
        assert!(t.is_finite());
        assert!(!Tensor1D::<CpuBackend>::new(vec![1.0, f64::NAN]).is_finite());
    }

    #[test]
    fn test_tensor1d_sigmoid_extremes() {
        let t = Tensor1D::<CpuBackend>::new(vec![0.0, 100.0, -100.0]);
        let s = t.sigmoid().to_vec();
        assert_eq!(s[0], 0.5);
        assert!(s[1] > 1.0 - 1e-10);
        assert!(s[2] < 1e-10);
        assert!(s.iter().all(|v| v.is_finite()));
    }
}
