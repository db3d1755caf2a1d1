use super::scalar::Scalar;
use super::tensor1d::Tensor1D;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed, row-major 2D tensor.
///
/// Used as the feature matrix: rows are observations, columns are features.
#[derive(Clone)]
pub struct Tensor2D<B: Backend> {
    pub(crate) data: B::Tensor2D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> std::fmt::Debug for Tensor2D<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (rows, cols) = self.shape();
        f.debug_struct("Tensor2D")
            .field("rows", &rows)
            .field("cols", &cols)
            .finish()
    }
}

impl<B: Backend> Tensor2D<B> {
    /// Creates a tensor from row-major host data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        Self {
            data: B::from_vec_2d(data, rows, cols),
            backend: PhantomData,
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: B::zeros_2d(rows, cols),
            backend: PhantomData,
        }
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        B::shape(&self.data)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        Scalar::<B>::from_raw(B::get_2d(&self.data, row, col)).to_f64()
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        B::set_2d(&mut self.data, row, col, B::scalar_f64(value));
    }

    /// Copies one row to the host.
    pub fn row(&self, row: usize) -> Vec<f64> {
        let (_, cols) = self.shape();
        (0..cols).map(|col| self.get(row, col)).collect()
    }

    /// `self @ other`.
    pub fn dot(&self, other: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D::from_raw(B::matvec(&self.data, &other.data))
    }

    /// `selfᵀ @ other`.
    pub fn tdot(&self, other: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D::from_raw(B::matvec_transposed(&self.data, &other.data))
    }
}
