use super::Backend;

/// Pure-Rust backend storing tensors in plain `Vec<f64>`.
#[derive(Clone, Debug, Copy)]
pub struct CpuBackend;

/// Row-major matrix: `(data, rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTensor2D(pub Vec<f64>, pub usize, pub usize);

impl CpuTensor2D {
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        Self(data, rows, cols)
    }
}

impl Backend for CpuBackend {
    type Scalar = f64;
    type Tensor1D = Vec<f64>;
    type Tensor2D = CpuTensor2D;
    fn zeros_1d(len: usize) -> Self::Tensor1D {
        vec![0.; len]
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(vec![0.; rows * cols], rows, cols)
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        data
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(data, rows, cols)
    }

    fn get_1d(t: &Self::Tensor1D, i: usize) -> f64 {
        t[i]
    }

    fn set_1d(t: &mut Self::Tensor1D, i: usize, value: f64) {
        t[i] = value;
    }

    fn get_2d(t: &Self::Tensor2D, row: usize, col: usize) -> f64 {
        assert!(row < t.1 && col < t.2, "index ({row}, {col}) out of bounds");
        t.0[row * t.2 + col]
    }

    fn set_2d(t: &mut Self::Tensor2D, row: usize, col: usize, value: f64) {
        assert!(row < t.1 && col < t.2, "index ({row}, {col}) out of bounds");
        t.0[row * t.2 + col] = value;
    }

    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "length mismatch");
        a.iter().zip(b.iter()).map(|(a, b)| a + b).collect()
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "length mismatch");
        a.iter().zip(b.iter()).map(|(a, b)| a - b).collect()
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "length mismatch");
        a.iter().zip(b.iter()).map(|(a, b)| a * b).collect()
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &f64) -> Self::Tensor1D {
        t.iter().map(|x| x * s).collect()
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &f64) -> Self::Tensor1D {
        t.iter().map(|x| x + s).collect()
    }

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.abs()).collect()
    }

    fn exp_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.exp()).collect()
    }

    fn log_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.ln()).collect()
    }

    fn maximum_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a.iter().zip(b).map(|(&x, &y)| x.max(y)).collect()
    }

    fn sigmoid_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        // σ(z) = 1 / (1 + e^(-z))     for z >= 0
        // σ(z) = e^z / (1 + e^z)      for z < 0
        t.iter()
            .map(|&z| {
                if z >= 0.0 {
                    1.0 / (1.0 + (-z).exp())
                } else {
                    let ez = z.exp();
                    ez / (1.0 + ez)
                }
            })
            .collect()
    }

    fn sum_all_1d(t: &Self::Tensor1D) -> f64 {
        t.iter().sum::<f64>()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> f64 {
        t.iter().sum::<f64>() / t.len() as f64
    }

    fn max_all_1d(t: &Self::Tensor1D) -> f64 {
        t.iter().fold(f64::NEG_INFINITY, |acc, &x| {
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
        t.clone()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        (t.1, t.2)
    }

    fn matvec(a: &CpuTensor2D, x: &Vec<f64>) -> Vec<f64> {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*cols, x.len(), "matvec: A.cols() != x.len()");
        (0..*rows)
            .map(|i| {
                data[i * cols..(i + 1) * cols]
                    .iter()
                    .zip(x)
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }

    fn matvec_transposed(a: &CpuTensor2D, x: &Vec<f64>) -> Vec<f64> {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*rows, x.len(), "matvec_transposed: A.rows() != x.len()");
        // Accumulate row by row so the matrix is walked in storage order.
        let mut out = vec![0.0; *cols];
        for (i, &xi) in x.iter().enumerate() {
            let row = &data[i * cols..(i + 1) * cols];
            for (acc, &aij) in out.iter_mut().zip(row) {
                *acc += aij * xi;
            }
        }
        out
    }
}
