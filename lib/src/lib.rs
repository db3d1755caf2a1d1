//! # batch-descent
//!
//! Linear regression by batch gradient descent, with a sigmoid-linked loss
//! for logistic regression, on pluggable dense-tensor backends.
//!
//! ## Core Design Principles
//!
//! - **Explicit sessions**: a [`Session`] owns the dataset, the parameter
//!   vector and the hyperparameters of one problem. It is created, filled,
//!   trained and destroyed explicitly; several sessions can coexist.
//! - **Stateless training logic**: the [`Trainer`] holds only loop settings
//!   and a loss. Losses, the regularizer and the update rule are separate
//!   components.
//! - **Backend Agnosticism**: the [`Backend`] trait lets the same code run on
//!   plain vectors ([`CpuBackend`]) or on `ndarray` (feature `ndarray`).
//! - **Separate stopping rule**: convergence tolerance and iteration cap are
//!   configured independently of the learning rate.
//!
//! ## Quick Start
//!
//! ```rust
//! use batch_descent::backend::CpuBackend;
//! use batch_descent::diagnostics::Verbosity;
//! use batch_descent::loss::SquaredError;
//! use batch_descent::{Session, Trainer, NO_REGULARIZATION};
//!
//! // y = 2x + 1
//! let mut session = Session::<CpuBackend>::new();
//! session.create(1, 4, 0.1, NO_REGULARIZATION).unwrap();
//! session
//!     .load(&[[0.0], [1.0], [2.0], [3.0]], &[1.0, 3.0, 5.0, 7.0])
//!     .unwrap();
//!
//! let trainer = Trainer::builder(SquaredError)
//!     .convergence_tolerance(1e-10)
//!     .verbosity(Verbosity::Silent)
//!     .build();
//! let theta = trainer.train(&mut session).unwrap();
//!
//! assert!((theta.intercept() - 1.0).abs() < 1e-6);
//! assert!((theta.coefficients().get(0) - 2.0).abs() < 1e-6);
//! ```
//!
//! ## Module Structure
//!
//! - `backend`: Tensor abstractions and computation primitives (`Tensor1D`, `Tensor2D`)
//! - `problem`: training sessions and hyperparameters
//! - `model`: the parameter vector `Theta`
//! - `loss`: squared error and the sigmoid-linked cross-entropy
//! - `regularizers`: L2 penalty and the no-regularization sentinel
//! - `optimizer`: batch gradient and the gradient descent update
//! - `trainer`: the convergence loop
//! - `config`: loop and session settings, loadable from JSON
//! - `diagnostics`: write-only progress logging
//! - `error`: the crate's error type

pub mod backend;

/// Run configuration, optionally loaded from JSON.
pub mod config;

/// Write-only diagnostics sinks and the training logger.
pub mod diagnostics;

pub mod error;

/// Cost functions over a linear predictor.
pub mod loss;

/// The parameter vector being learned.
pub mod model;

/// Gradient computation and parameter update rule.
pub mod optimizer;

/// Training sessions: dataset, parameters and hyperparameters.
pub mod problem;

/// Weight regularization strategies.
pub mod regularizers;

/// The convergence-controlled training loop.
pub mod trainer;

/// Re-export of core types for convenient usage.
#[cfg(feature = "cpu")]
pub use backend::CpuBackend;
pub use backend::{Backend, ScalarOps, Tensor1D, Tensor2D};
pub use error::{Error, Result};
pub use model::Theta;
pub use problem::{Hyperparameters, ProblemHandles, Session, SessionState, DEFAULT_ECHELON};
pub use regularizers::{Regularization, NO_REGULARIZATION};
pub use trainer::{Trainer, TrainerBuilder};
