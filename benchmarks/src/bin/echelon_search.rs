//! Echelon (learning rate) sweep for batch gradient descent.
//!
//! ```text
//! cargo run --package benchmarks --bin echelon_search -- \
//!     [--csv data.csv] [--features 0,2] [--logistic] [--lambda 0.1] \
//!     [--repeats 5] [--out-json results.json]
//! ```
//!
//! Without `--csv` the sweep runs on noise-free synthetic data with known
//! coefficients (binary labels with `--logistic`). CSV data (last column is
//! the target) is standardized with training statistics first. Regression
//! runs are scored with MSE/MAE/R², logistic runs with accuracy.

use std::path::PathBuf;
use std::process::ExitCode;

use batch_descent::diagnostics::Verbosity;
use batch_descent::loss::{Loss, SigmoidLinked, SquaredError};
use batch_descent::{CpuBackend, Error, Session, Tensor1D, Trainer, NO_REGULARIZATION};
use benchmarks::{benchmark_with_warmup, BenchmarkStats, Metrics, RegressionDataset, RegressionMetrics};
use serde::Serialize;

const ECHELONS: [f64; 10] = [1e-3, 3e-3, 1e-2, 3e-2, 0.1, 0.3, 0.5, 1.0, 2.0, 5.0];
const MAX_ITERATIONS: usize = 200_000;
const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Serialize)]
struct SweepResult {
    echelon: f64,
    outcome: &'static str,
    iterations: usize,
    timing: BenchmarkStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<RegressionMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
}

struct Args {
    csv: Option<PathBuf>,
    features: Option<Vec<usize>>,
    logistic: bool,
    lambda: f64,
    repeats: usize,
    out_json: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        csv: None,
        features: None,
        logistic: false,
        lambda: NO_REGULARIZATION,
        repeats: 1,
        out_json: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--csv" => args.csv = Some(it.next().ok_or("--csv requires a path")?.into()),
            "--out-json" => {
                args.out_json = Some(it.next().ok_or("--out-json requires a path")?.into())
            }
            "--logistic" => args.logistic = true,
            "--features" => {
                let value = it.next().ok_or("--features requires a list")?;
                let indices = value
                    .split(',')
                    .map(|s| s.trim().parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| format!("bad --features {value}: {e}"))?;
                args.features = Some(indices);
            }
            "--lambda" => {
                let value = it.next().ok_or("--lambda requires a value")?;
                args.lambda = value
                    .parse()
                    .map_err(|e| format!("bad --lambda {value}: {e}"))?;
            }
            "--repeats" => {
                let value = it.next().ok_or("--repeats requires a value")?;
                args.repeats = match value.parse() {
                    Ok(0) | Err(_) => return Err(format!("bad --repeats {value}")),
                    Ok(n) => n,
                };
            }
            other => return Err(format!("unknown arg: {other}")),
        }
    }
    Ok(args)
}

fn load_data(args: &Args) -> Result<(RegressionDataset, RegressionDataset), String> {
    let (train, test) = match &args.csv {
        Some(path) => {
            let data = RegressionDataset::from_csv(path)
                .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
            let (train, test) = data.split(0.8);
            train.standardize_with(&test)
        }
        None if args.logistic => {
            RegressionDataset::synthetic_binary(2_000, &[1.5, -2.0, 0.5], 0.25).split(0.8)
        }
        None => RegressionDataset::synthetic_linear(2_000, &[1.5, -2.0, 0.5], 3.0).split(0.8),
    };

    match &args.features {
        Some(indices) => {
            if let Some(bad) = indices.iter().find(|&&j| j >= train.n_features()) {
                return Err(format!(
                    "feature {bad} out of range ({} features)",
                    train.n_features()
                ));
            }
            Ok((train.select_features(indices), test.select_features(indices)))
        }
        None => Ok((train, test)),
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    let (train, test) = match load_data(&args) {
        Ok(data) => data,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    println!("Echelon sweep for batch gradient descent");
    println!("========================================\n");
    println!(
        "{} training / {} test observations, {} features, {} loss, {} run(s) per echelon\n",
        train.len(),
        test.len(),
        train.n_features(),
        if args.logistic { "sigmoid-linked" } else { "squared error" },
        args.repeats
    );

    let results = if args.logistic {
        sweep(SigmoidLinked, &train, &test, &args)
    } else {
        sweep(SquaredError, &train, &test, &args)
    };
    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("sweep failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(best) = results
        .iter()
        .filter(|r| r.outcome == "converged")
        .min_by_key(|r| r.iterations)
    {
        println!(
            "\nFastest converging echelon: {} ({} iterations)",
            best.echelon, best.iterations
        );
    }

    if let Some(path) = args.out_json {
        let written = serde_json::to_string_pretty(&results)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        println!("results written to {}", path.display());
    }
    ExitCode::SUCCESS
}

fn sweep<L: Loss<CpuBackend> + Clone>(
    loss: L,
    train: &RegressionDataset,
    test: &RegressionDataset,
    args: &Args,
) -> Result<Vec<SweepResult>, Error> {
    let trainer = Trainer::<CpuBackend, _>::builder(loss.clone())
        .max_iterations(MAX_ITERATIONS)
        .convergence_tolerance(TOLERANCE)
        .verbosity(Verbosity::Silent)
        .build();

    let mut results = Vec::with_capacity(ECHELONS.len());
    for echelon in ECHELONS {
        let result = sweep_one(&trainer, &loss, train, test, echelon, args)?;
        let score = match (&result.metrics, result.accuracy) {
            (Some(m), _) => format!("MSE = {:.6}, R² = {:.4}", m.mse, m.r_squared),
            (None, Some(accuracy)) => format!("accuracy = {accuracy:.4}"),
            (None, None) => String::new(),
        };
        println!(
            "echelon = {echelon:<6}: {:<24} {:>7} it, {:>9.2} ms  {score}",
            result.outcome, result.iterations, result.timing.median_ms
        );
        results.push(result);
    }
    Ok(results)
}

fn sweep_one<L: Loss<CpuBackend>>(
    trainer: &Trainer<CpuBackend, L>,
    loss: &L,
    train: &RegressionDataset,
    test: &RegressionDataset,
    echelon: f64,
    args: &Args,
) -> Result<SweepResult, Error> {
    // Every run trains a fresh session; only the last one is scored.
    let warmup = usize::from(args.repeats > 1);
    let (runs, timing) = benchmark_with_warmup(warmup, args.repeats, || -> Result<_, Error> {
        let mut session = Session::<CpuBackend>::new();
        train.load_into(&mut session, echelon, args.lambda)?;
        let outcome = match trainer.train(&mut session) {
            Ok(_) => "converged",
            Err(Error::MaxIterationsExceeded { .. }) => "max_iterations_exceeded",
            Err(Error::GradientComputationFailed { .. }) => "diverged",
            Err(e) => return Err(e),
        };
        Ok((outcome, session))
    });

    let mut last = None;
    for run in runs {
        last = Some(run?);
    }
    let Some((outcome, session)) = last else {
        return Err(Error::InvalidConfig("no timed runs".into()));
    };

    // A diverged run leaves the starting theta in place; scoring it is meaningless.
    let (metrics, accuracy) = if outcome == "diverged" {
        (None, None)
    } else {
        let z = Tensor1D::<CpuBackend>::new(test.predict(session.theta()?));
        let predictions = loss.link(&z).to_vec();
        if args.logistic {
            (None, Some(Metrics::accuracy(test.target(), &predictions)))
        } else {
            (Some(Metrics::calculate_all(test.target(), &predictions)), None)
        }
    };

    Ok(SweepResult {
        echelon,
        outcome,
        iterations: session.iterations(),
        timing,
        metrics,
        accuracy,
    })
}
