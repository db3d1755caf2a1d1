//! # Backend Abstraction
//!
//! Dense tensor storage and the handful of numerical kernels batch gradient
//! descent needs: matrix-vector products in both orientations, element-wise
//! arithmetic, reductions and the sigmoid link.
//!
//! Backend selection happens at compile time via a type parameter, so the
//! session and trainer code is written once and runs on every backend.
//!
//! | Backend          | Feature   | Storage                         |
//! |------------------|-----------|---------------------------------|
//! | `CpuBackend`     | `cpu`     | row-major `Vec<f64>`            |
//! | `NdarrayBackend` | `ndarray` | `ndarray::Array1` / `Array2`    |
//!
//! ## Example
//!
//! ```rust
//! use batch_descent::backend::{CpuBackend, Tensor1D, Tensor2D};
//!
//! let x: Tensor2D<CpuBackend> = Tensor2D::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
//! let w: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 0.0]);
//! assert_eq!(x.dot(&w).to_vec(), vec![1.0, 3.0]);
//! ```

#[cfg(feature = "cpu")]
mod cpu;
#[cfg(feature = "cpu")]
/// Pure-Rust CPU backend with no external dependencies.
pub use cpu::{CpuBackend, CpuTensor2D};

#[cfg(feature = "ndarray")]
mod ndarray_backend;
#[cfg(feature = "ndarray")]
/// Backend backed by the `ndarray` crate.
pub use ndarray_backend::{NdarrayBackend, NdarrayTensor2D};

/// Scalar value representation and arithmetic operations.
pub mod scalar;
/// One-dimensional tensor abstraction.
pub mod tensor1d;
/// Two-dimensional tensor abstraction.
pub mod tensor2d;

pub use scalar::{Scalar, ScalarOps};
pub use tensor1d::Tensor1D;
pub use tensor2d::Tensor2D;

/// Minimal set of dense tensor operations required for training.
///
/// Implementations provide concrete tensor types and the kernels below.
/// Shape mismatches are programming errors and panic; the session layer
/// validates shapes before any kernel is reached.
///
/// Tensors are `Clone + Send + Sync` so sessions can be moved across threads.
pub trait Backend: Clone + Copy + std::fmt::Debug + 'static {
    /// Scalar type supporting arithmetic operations.
    type Scalar: ScalarOps;

    /// One-dimensional tensor type.
    type Tensor1D: Clone + Send + Sync;

    /// Two-dimensional, row-major tensor type.
    type Tensor2D: Clone + Send + Sync;

    // --- Constructors ---

    /// Creates a 1D tensor of `len` zeros.
    fn zeros_1d(len: usize) -> Self::Tensor1D;

    /// Creates a `rows × cols` tensor of zeros.
    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D;

    /// Constructs a 1D tensor from owned data.
    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D;

    /// Constructs a 2D tensor from row-major data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D;

    // --- Element access ---

    fn get_1d(t: &Self::Tensor1D, i: usize) -> Self::Scalar;
    fn set_1d(t: &mut Self::Tensor1D, i: usize, value: Self::Scalar);
    fn get_2d(t: &Self::Tensor2D, row: usize, col: usize) -> Self::Scalar;
    fn set_2d(t: &mut Self::Tensor2D, row: usize, col: usize, value: Self::Scalar);

    // --- Element-wise operations ---

    /// Element-wise `a + b`.
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise `a - b`.
    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise `a * b`.
    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Multiplies every element by `s`.
    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;

    /// Adds `s` to every element.
    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D;
    fn exp_1d(t: &Self::Tensor1D) -> Self::Tensor1D;
    fn log_1d(t: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise maximum of two tensors.
    fn maximum_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise logistic function `1 / (1 + e^(-x))`, evaluated without
    /// overflow for large `|x|`.
    fn sigmoid_1d(t: &Self::Tensor1D) -> Self::Tensor1D;

    // --- Reductions ---

    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    /// Arithmetic mean of all elements.
    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    /// Largest element. `-inf` for an empty tensor; NaN if any element is NaN.
    fn max_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    /// `true` when no element is NaN or infinite.
    fn all_finite_1d(t: &Self::Tensor1D) -> bool;

    // --- Scalars and host access ---

    /// Creates a backend scalar from an `f64`.
    fn scalar_f64(value: f64) -> Self::Scalar;

    /// Copies a 1D tensor to the host.
    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64>;

    fn len_1d(t: &Self::Tensor1D) -> usize;

    /// Returns `(rows, cols)`.
    fn shape(t: &Self::Tensor2D) -> (usize, usize);

    // --- Linear algebra ---

    /// `A @ x` for `A: (m × n)`, `x: (n,)`.
    ///
    /// # Panics
    /// If `A.cols() != x.len()`.
    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;

    /// `Aᵀ @ x` for `A: (m × n)`, `x: (m,)`.
    ///
    /// # Panics
    /// If `A.rows() != x.len()`.
    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;
}
