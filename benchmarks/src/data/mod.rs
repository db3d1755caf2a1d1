//! Datasets for benchmarks: a deterministic synthetic generator and a CSV
//! loader (the last column is the target).

use batch_descent::{Backend, Error, Session, Tensor2D, Theta};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Dense regression data held on the host.
#[derive(Debug, Clone)]
pub struct RegressionDataset {
    features: Vec<Vec<f64>>,
    target: Vec<f64>,
}

impl RegressionDataset {
    /// # Panics
    /// If the row count and target length differ or rows are ragged.
    pub fn new(features: Vec<Vec<f64>>, target: Vec<f64>) -> Self {
        assert_eq!(features.len(), target.len(), "features and target length mismatch");
        let n_features = features.first().map_or(0, Vec::len);
        assert!(
            features.iter().all(|row| row.len() == n_features),
            "All rows must have same length"
        );
        Self { features, target }
    }

    /// Noise-free linear data: `y = intercept + Σ coefficient_j * x_j`.
    ///
    /// Features follow a fixed pattern in `[-1, 1]`, so runs are reproducible
    /// without a random generator.
    pub fn synthetic_linear(n_observations: usize, coefficients: &[f64], intercept: f64) -> Self {
        let n_features = coefficients.len();
        let features: Vec<Vec<f64>> = (0..n_observations)
            .map(|i| {
                (0..n_features)
                    .map(|j| {
                        let phase = (i * (2 * j + 3) + 5 * j) % 97;
                        phase as f64 / 48.0 - 1.0
                    })
                    .collect()
            })
            .collect();
        let target = features
            .iter()
            .map(|row| {
                intercept
                    + row
                        .iter()
                        .zip(coefficients)
                        .map(|(x, w)| x * w)
                        .sum::<f64>()
            })
            .collect();
        Self { features, target }
    }

    /// Binary labels from thresholding a synthetic linear score at 0.
    pub fn synthetic_binary(n_observations: usize, coefficients: &[f64], intercept: f64) -> Self {
        let linear = Self::synthetic_linear(n_observations, coefficients, intercept);
        let target = linear
            .target
            .iter()
            .map(|score| if *score > 0.0 { 1.0 } else { 0.0 })
            .collect();
        Self {
            features: linear.features,
            target,
        }
    }

    /// Loads a headed CSV file whose last column is the target.
    ///
    /// ```no_run
    /// use benchmarks::data::RegressionDataset;
    ///
    /// let dataset = RegressionDataset::from_csv("datasets/housing.csv").unwrap();
    /// ```
    pub fn from_csv<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut rdr = ReaderBuilder::new().from_reader(BufReader::new(file));

        let mut features = Vec::new();
        let mut target = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            let values = record
                .iter()
                .map(|field| field.trim().parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("record {}: {e}", line + 1),
                    )
                })?;
            let Some((last, row)) = values.split_last() else {
                continue;
            };
            features.push(row.to_vec());
            target.push(*last);
        }

        let n_features = features.first().map_or(0, Vec::len);
        if features.iter().any(|row| row.len() != n_features) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "records have different lengths",
            ));
        }
        Ok(Self { features, target })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Keeps only the listed feature columns.
    pub fn select_features(&self, feature_indices: &[usize]) -> Self {
        let features = self
            .features
            .iter()
            .map(|row| feature_indices.iter().map(|&j| row[j]).collect())
            .collect();
        Self {
            features,
            target: self.target.clone(),
        }
    }

    /// Splits into `(train, test)` without shuffling.
    pub fn split(&self, train_ratio: f64) -> (Self, Self) {
        let n_train = ((self.len() as f64) * train_ratio) as usize;
        let n_train = n_train.min(self.len());
        (
            Self {
                features: self.features[..n_train].to_vec(),
                target: self.target[..n_train].to_vec(),
            },
            Self {
                features: self.features[n_train..].to_vec(),
                target: self.target[n_train..].to_vec(),
            },
        )
    }

    /// Z-scores `self` and `other` with statistics taken from `self`.
    ///
    /// The library does no scaling of its own; real-world CSV data needs
    /// it before plain gradient descent behaves.
    pub fn standardize_with(&self, other: &Self) -> (Self, Self) {
        let n = self.len().max(1) as f64;
        let n_features = self.n_features();
        let means: Vec<f64> = (0..n_features)
            .map(|j| self.features.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let stds: Vec<f64> = (0..n_features)
            .map(|j| {
                let var = self
                    .features
                    .iter()
                    .map(|row| (row[j] - means[j]).powi(2))
                    .sum::<f64>()
                    / n;
                if var.sqrt() > 1e-12 {
                    var.sqrt()
                } else {
                    1.0
                }
            })
            .collect();

        let scale = |data: &Self| Self {
            features: data
                .features
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .map(|(j, x)| (x - means[j]) / stds[j])
                        .collect()
                })
                .collect(),
            target: data.target.clone(),
        };
        (scale(self), scale(other))
    }

    /// Linear predictor `intercept + row · coefficients` for every row.
    pub fn predict<B: Backend>(&self, theta: &Theta<B>) -> Vec<f64> {
        let flat: Vec<f64> = self.features.iter().flatten().copied().collect();
        let x = Tensor2D::<B>::new(flat, self.len(), self.n_features());
        theta.linear_combination(&x).to_vec()
    }

    /// Creates a problem sized for this dataset in `session` and loads it.
    pub fn load_into<B: Backend>(
        &self,
        session: &mut Session<B>,
        echelon: f64,
        lambda: f64,
    ) -> Result<(), Error> {
        session.create(self.n_features(), self.len(), echelon, lambda)?;
        session.load(&self.features, &self.target)
    }
}
