//! Benchmark utilities for batch-descent.
//!
//! - Data loading: deterministic synthetic datasets and CSV files
//! - Metrics calculation (MSE, MAE, R², accuracy)
//! - Timing utilities

pub mod data;
pub mod metrics;
pub mod utils;

pub use data::RegressionDataset;
pub use metrics::{Metrics, RegressionMetrics};
pub use utils::{benchmark_with_warmup, time_fn, BenchmarkStats};
