use super::Backend;
use ndarray::{Array1, Array2};

/// Backend using the `ndarray` crate.
///
/// # Type mappings
/// - `Scalar`: `f64`
/// - `Tensor1D`: `ndarray::Array1<f64>`
/// - `Tensor2D`: [`NdarrayTensor2D`] around `ndarray::Array2<f64>`
///
/// Tensors are tagged with their backend, so they cannot be mixed with
/// [`CpuBackend`](crate::backend::CpuBackend) tensors:
///
/// ```compile_fail
/// use batch_descent::backend::{CpuBackend, NdarrayBackend, Tensor1D};
///
/// let a: Tensor1D<CpuBackend> = Tensor1D::zeros(3);
/// let b: Tensor1D<NdarrayBackend> = Tensor1D::zeros(3);
/// let _ = a.sub(&b);
/// ```
///
/// The same code with matching backends compiles:
///
/// ```
/// use batch_descent::backend::{NdarrayBackend, Tensor1D};
///
/// let a: Tensor1D<NdarrayBackend> = Tensor1D::zeros(3);
/// let b: Tensor1D<NdarrayBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
/// assert_eq!(a.sub(&b).to_vec(), vec![-1.0, -2.0, -3.0]);
/// ```
#[derive(Clone, Debug, Copy)]
pub struct NdarrayBackend;

/// Wrapper around `Array2<f64>` so the backend can own the trait impls.
#[derive(Debug, Clone, PartialEq)]
pub struct NdarrayTensor2D(pub Array2<f64>);

impl Backend for NdarrayBackend {
    type Scalar = f64;
    type Tensor1D = Array1<f64>;
    type Tensor2D = NdarrayTensor2D;
    fn zeros_1d(len: usize) -> Self::Tensor1D {
        Array1::zeros(len)
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        NdarrayTensor2D(Array2::zeros((rows, cols)))
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        Array1::from_vec(data)
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        NdarrayTensor2D(Array2::from_shape_fn((rows, cols), |(i, j)| data[i * cols + j]))
    }

    fn get_1d(t: &Self::Tensor1D, i: usize) -> f64 {
        t[i]
    }

    fn set_1d(t: &mut Self::Tensor1D, i: usize, value: f64) {
        t[i] = value;
    }

    fn get_2d(t: &Self::Tensor2D, row: usize, col: usize) -> f64 {
        t.0[[row, col]]
    }

    fn set_2d(t: &mut Self::Tensor2D, row: usize, col: usize, value: f64) {
        t.0[[row, col]] = value;
    }

    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a + b
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a - b
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a * b
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &f64) -> Self::Tensor1D {
        t * *s
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &f64) -> Self::Tensor1D {
        t + *s
    }

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(f64::abs)
    }

    fn exp_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(f64::exp)
    }

    fn log_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(f64::ln)
    }

    fn maximum_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        ndarray::Zip::from(a).and(b).map_collect(|&x, &y| x.max(y))
    }

    fn sigmoid_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(|z| {
            if z >= 0.0 {
                1.0 / (1.0 + (-z).exp())
            } else {
                let ez = z.exp();
                ez / (1.0 + ez)
            }
        })
    }

    fn sum_all_1d(t: &Self::Tensor1D) -> f64 {
        t.sum()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> f64 {
        t.sum() / t.len() as f64
    }

    fn max_all_1d(t: &Self::Tensor1D) -> f64 {
        t.fold(f64::NEG_INFINITY, |acc, &x| {
            if x.is_nan() || acc.is_nan() {
                f64::NAN
            } else {
                acc.max(x)
            }
        })
    }

    fn all_finite_1d(t: &Self::Tensor1D) -> bool {
        t.iter().all(|x| x.is_finite())
    }

    fn scalar_f64(value: f64) -> f64 {
        value
    }

    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.to_vec()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        t.0.dim()
    }

    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        a.0.dot(x)
    }

    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        a.0.t().dot(x)
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, Tensor1D, Tensor2D};

    #[test]
    fn test_matvec_agrees_with_cpu() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let v = vec![1.0, 0.0, 2.0];

        let a_nd = Tensor2D::<NdarrayBackend>::new(data.clone(), 3, 2);
        let a_cpu = Tensor2D::<CpuBackend>::new(data, 3, 2);
        let v_nd = Tensor1D::<NdarrayBackend>::new(v.clone());
        let v_cpu = Tensor1D::<CpuBackend>::new(v);

        assert_eq!(a_nd.tdot(&v_nd).to_vec(), a_cpu.tdot(&v_cpu).to_vec());

        let w_nd = Tensor1D::<NdarrayBackend>::new(vec![0.5, -1.0]);
        let w_cpu = Tensor1D::<CpuBackend>::new(vec![0.5, -1.0]);
        assert_eq!(a_nd.dot(&w_nd).to_vec(), a_cpu.dot(&w_cpu).to_vec());
    }

    #[test]
    fn test_row_major_layout() {
        let t = NdarrayBackend::from_vec_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(t.0[[0, 2]], 3.0);
        assert_eq!(t.0[[1, 0]], 4.0);
        assert_eq!(NdarrayBackend::shape(&t), (2, 3));
    }

    #[test]
    fn test_sigmoid_and_max() {
        let t = Array1::from_vec(vec![0.0, -100.0, 3.0]);
        let s = NdarrayBackend::sigmoid_1d(&t);
        assert_eq!(s[0], 0.5);
        assert!(s[1] < 1e-10);
        assert_eq!(NdarrayBackend::max_all_1d(&t), 3.0);
    }
}
