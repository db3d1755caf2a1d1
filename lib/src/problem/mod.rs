//! # Problem Store
//!
//! A [`Session`] owns one learning problem: the feature matrix, the response
//! vector, the parameter vector and the hyperparameters. It is created
//! explicitly, handed to the trainer for every operation and destroyed
//! explicitly (or on drop). Independent sessions can coexist.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --create--> Initialized --train--> Converged
//!       ^                        |          \----> MaxIterationsExceeded
//!       +--------destroy---------+---------------------+
//! ```
//!
//! ```rust
//! use batch_descent::backend::CpuBackend;
//! use batch_descent::problem::{Session, SessionState};
//! use batch_descent::NO_REGULARIZATION;
//!
//! let mut session = Session::<CpuBackend>::new();
//! let handles = session.create(2, 3, 0.01, NO_REGULARIZATION).unwrap();
//! handles.features.set(0, 0, 1.0);
//! handles.responses.set(0, 1.0);
//! assert_eq!(session.state(), SessionState::Initialized);
//!
//! session.destroy().unwrap();
//! assert_eq!(session.state(), SessionState::Uninitialized);
//! ```

use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::model::Theta;

mod hyperparameters;

pub use hyperparameters::{Hyperparameters, DEFAULT_ECHELON};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    /// Buffers allocated; training may run.
    Initialized,
    /// The last training run met the convergence tolerance.
    Converged,
    /// The last training run hit the iteration cap.
    MaxIterationsExceeded,
}

impl SessionState {
    /// `true` once training has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::MaxIterationsExceeded)
    }
}

/// Mutable borrows of the three caller-populated buffers.
///
/// Returned by [`Session::create`] and [`Session::handles`]; they cannot
/// outlive the session they point into. A buffer replaced with one of a
/// different shape is rejected with [`Error::ShapeMismatch`] by the next
/// training operation.
#[derive(Debug)]
pub struct ProblemHandles<'a, B: Backend> {
    /// `n_observations × n_features`, one row per observation.
    pub features: &'a mut Tensor2D<B>,
    /// One response per observation.
    pub responses: &'a mut Tensor1D<B>,
    /// Starting point of the next training run; receives the result.
    pub theta: &'a mut Theta<B>,
}

#[derive(Debug, Clone)]
pub(crate) struct Problem<B: Backend> {
    n_features: usize,
    n_observations: usize,
    pub(crate) features: Tensor2D<B>,
    pub(crate) responses: Tensor1D<B>,
    pub(crate) theta: Theta<B>,
    pub(crate) hyperparameters: Hyperparameters,
    pub(crate) state: SessionState,
    pub(crate) iterations: usize,
}

impl<B: Backend> Problem<B> {
    pub(crate) fn n_features(&self) -> usize {
        self.n_features
    }

    pub(crate) fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// Checks the buffers against the dimensions fixed at creation.
    pub(crate) fn check_shapes(&self) -> Result<()> {
        let (rows, cols) = self.features.shape();
        check_dim("feature rows", self.n_observations, rows)?;
        check_dim("feature columns", self.n_features, cols)?;
        check_dim("responses", self.n_observations, self.responses.len())?;
        check_dim("theta coefficients", self.n_features, self.theta.n_features())
    }
}

fn check_dim(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            what,
            expected,
            got,
        })
    }
}

/// One training session.
#[derive(Debug)]
pub struct Session<B: Backend> {
    problem: Option<Problem<B>>,
}

impl<B: Backend> Default for Session<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Session<B> {
    /// An uninitialized session.
    pub fn new() -> Self {
        Self { problem: None }
    }

    /// Allocates zero-filled buffers for a new problem and returns handles
    /// to them.
    ///
    /// `lambda` equal to [`NO_REGULARIZATION`](crate::NO_REGULARIZATION)
    /// disables regularization.
    ///
    /// # Errors
    /// - [`Error::AlreadyInitialized`] if a problem is live; it is left untouched.
    /// - [`Error::InvalidDimensions`] if either dimension is zero.
    /// - [`Error::InvalidHyperparameter`] for a non-positive or non-finite
    ///   `echelon`, or a negative/NaN `lambda`.
    pub fn create(
        &mut self,
        n_features: usize,
        n_observations: usize,
        echelon: f64,
        lambda: f64,
    ) -> Result<ProblemHandles<'_, B>> {
        if self.problem.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let hyperparameters = Hyperparameters::new(echelon, lambda)?;
        self.create_with(n_features, n_observations, hyperparameters)
    }

    /// [`Session::create`] with already validated hyperparameters.
    pub fn create_with(
        &mut self,
        n_features: usize,
        n_observations: usize,
        hyperparameters: Hyperparameters,
    ) -> Result<ProblemHandles<'_, B>> {
        if self.problem.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        if n_features == 0 || n_observations == 0 {
            return Err(Error::InvalidDimensions {
                n_features,
                n_observations,
            });
        }

        // Everything is built before the session is touched.
        let problem = Problem {
            n_features,
            n_observations,
            features: Tensor2D::zeros(n_observations, n_features),
            responses: Tensor1D::zeros(n_observations),
            theta: Theta::zeros(n_features),
            hyperparameters,
            state: SessionState::Initialized,
            iterations: 0,
        };
        self.problem = Some(problem);
        self.handles()
    }

    /// [`Session::create`] from a config section.
    pub fn from_config(&mut self, config: &SessionConfig) -> Result<ProblemHandles<'_, B>> {
        if self.problem.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let hyperparameters = config.hyperparameters()?;
        self.create_with(config.n_features, config.n_observations, hyperparameters)
    }

    /// Releases every buffer and returns to [`SessionState::Uninitialized`].
    ///
    /// Destroying an uninitialized session is a no-op that succeeds.
    pub fn destroy(&mut self) -> Result<()> {
        self.problem = None;
        Ok(())
    }

    /// Handles to the live buffers.
    pub fn handles(&mut self) -> Result<ProblemHandles<'_, B>> {
        let problem = self.problem.as_mut().ok_or(Error::NotInitialized)?;
        Ok(ProblemHandles {
            features: &mut problem.features,
            responses: &mut problem.responses,
            theta: &mut problem.theta,
        })
    }

    /// Copies a dataset from host memory into the session buffers.
    ///
    /// `rows` holds one slice per observation. All sizes are checked before
    /// anything is written.
    ///
    /// # Errors
    /// [`Error::NotInitialized`], or [`Error::ShapeMismatch`] when the data
    /// does not match the session's dimensions.
    pub fn load<R: AsRef<[f64]>>(&mut self, rows: &[R], responses: &[f64]) -> Result<()> {
        let problem = self.problem.as_mut().ok_or(Error::NotInitialized)?;
        let (n_observations, n_features) = (problem.n_observations, problem.n_features);

        if rows.len() != n_observations {
            return Err(Error::ShapeMismatch {
                what: "feature rows",
                expected: n_observations,
                got: rows.len(),
            });
        }
        if let Some(bad) = rows.iter().find(|row| row.as_ref().len() != n_features) {
            return Err(Error::ShapeMismatch {
                what: "feature row length",
                expected: n_features,
                got: bad.as_ref().len(),
            });
        }
        if responses.len() != n_observations {
            return Err(Error::ShapeMismatch {
                what: "responses",
                expected: n_observations,
                got: responses.len(),
            });
        }

        let data: Vec<f64> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        problem.features = Tensor2D::new(data, n_observations, n_features);
        problem.responses = Tensor1D::new(responses.to_vec());
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.problem.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.problem
            .as_ref()
            .map_or(SessionState::Uninitialized, |p| p.state)
    }

    /// Iterations performed by the last training run (0 before any run).
    pub fn iterations(&self) -> usize {
        self.problem.as_ref().map_or(0, |p| p.iterations)
    }

    pub fn n_features(&self) -> Result<usize> {
        self.live().map(Problem::n_features)
    }

    pub fn n_observations(&self) -> Result<usize> {
        self.live().map(Problem::n_observations)
    }

    pub fn hyperparameters(&self) -> Result<Hyperparameters> {
        self.live().map(|p| p.hyperparameters)
    }

    pub fn features(&self) -> Result<&Tensor2D<B>> {
        self.live().map(|p| &p.features)
    }

    pub fn features_mut(&mut self) -> Result<&mut Tensor2D<B>> {
        self.live_mut().map(|p| &mut p.features)
    }

    pub fn responses(&self) -> Result<&Tensor1D<B>> {
        self.live().map(|p| &p.responses)
    }

    pub fn responses_mut(&mut self) -> Result<&mut Tensor1D<B>> {
        self.live_mut().map(|p| &mut p.responses)
    }

    pub fn theta(&self) -> Result<&Theta<B>> {
        self.live().map(|p| &p.theta)
    }

    pub fn theta_mut(&mut self) -> Result<&mut Theta<B>> {
        self.live_mut().map(|p| &mut p.theta)
    }

    pub(crate) fn live(&self) -> Result<&Problem<B>> {
        self.problem.as_ref().ok_or(Error::NotInitialized)
    }

    pub(crate) fn live_mut(&mut self) -> Result<&mut Problem<B>> {
        self.problem.as_mut().ok_or(Error::NotInitialized)
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        let _ = self.destroy();
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::regularizers::{Regularization, NO_REGULARIZATION};

    fn fill_identity(handles: ProblemHandles<'_, CpuBackend>, n: usize) {
        for i in 0..n {
            handles.features.set(i, i, 1.0);
            handles.responses.set(i, 1.0);
        }
    }

    #[test]
    fn test_create_returns_zeroed_buffers() {
        let mut session = Session::<CpuBackend>::new();
        let handles = session.create(3, 2, 0.01, NO_REGULARIZATION).unwrap();

        assert_eq!(handles.features.shape(), (2, 3));
        assert_eq!(handles.responses.to_vec(), vec![0.0; 2]);
        assert_eq!(handles.theta.to_vec(), vec![0.0; 4]);

        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(session.n_features().unwrap(), 3);
        assert_eq!(session.n_observations().unwrap(), 2);
        assert_eq!(session.iterations(), 0);
    }

    #[test]
    fn test_create_twice_fails_and_keeps_buffers() {
        let mut session = Session::<CpuBackend>::new();
        fill_identity(session.create(2, 2, 0.01, NO_REGULARIZATION).unwrap(), 2);

        let err = session.create(5, 7, 0.5, 1.0).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized));

        let err = session
            .from_config(&SessionConfig::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized));

        assert_eq!(session.features().unwrap().shape(), (2, 2));
        assert_eq!(session.features().unwrap().get(1, 1), 1.0);
        assert_eq!(session.responses().unwrap().to_vec(), vec![1.0, 1.0]);
        assert_eq!(session.hyperparameters().unwrap().echelon(), 0.01);
    }

    #[test]
    fn test_destroy_then_create_is_fresh() {
        let mut session = Session::<CpuBackend>::new();
        let handles = session.create(2, 2, 0.01, NO_REGULARIZATION).unwrap();
        fill_identity(handles, 2);
        session.theta_mut().unwrap().coefficients.set(0, 9.0);

        session.destroy().unwrap();
        assert_eq!(session.state(), SessionState::Uninitialized);

        let handles = session.create(2, 2, 0.01, NO_REGULARIZATION).unwrap();
        assert_eq!(handles.features.row(0), vec![0.0, 0.0]);
        assert_eq!(handles.features.row(1), vec![0.0, 0.0]);
        assert_eq!(handles.responses.to_vec(), vec![0.0, 0.0]);
        assert_eq!(handles.theta.to_vec(), vec![0.0; 3]);
    }

    #[test]
    fn test_destroy_uninitialized_is_noop() {
        let mut session = Session::<CpuBackend>::new();
        assert!(session.destroy().is_ok());
        assert!(session.destroy().is_ok());
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut session = Session::<CpuBackend>::new();
        assert!(matches!(
            session.create(0, 4, 0.01, NO_REGULARIZATION),
            Err(Error::InvalidDimensions {
                n_features: 0,
                n_observations: 4
            })
        ));
        assert!(matches!(
            session.create(4, 0, 0.01, NO_REGULARIZATION),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(!session.is_initialized());
    }

    #[test]
    fn test_invalid_hyperparameters_leave_session_uninitialized() {
        let mut session = Session::<CpuBackend>::new();
        assert!(session.create(2, 2, -1.0, NO_REGULARIZATION).is_err());
        assert!(session.create(2, 2, 0.1, f64::NAN).is_err());
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_accessors_require_live_problem() {
        let mut session = Session::<CpuBackend>::new();
        assert!(matches!(session.features(), Err(Error::NotInitialized)));
        assert!(matches!(session.responses_mut(), Err(Error::NotInitialized)));
        assert!(matches!(session.theta(), Err(Error::NotInitialized)));
        assert!(matches!(session.handles(), Err(Error::NotInitialized)));
        assert!(matches!(session.hyperparameters(), Err(Error::NotInitialized)));
        assert!(matches!(
            session.load(&[vec![1.0]], &[1.0]),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_load_checks_shapes() {
        let mut session = Session::<CpuBackend>::new();
        session.create(2, 2, 0.01, NO_REGULARIZATION).unwrap();

        let err = session.load(&[vec![1.0, 2.0]], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                what: "feature rows",
                expected: 2,
                got: 1
            }
        ));

        let err = session
            .load(&[vec![1.0, 2.0], vec![3.0]], &[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 2, got: 1, .. }));

        let err = session
            .load(&[vec![1.0, 2.0], vec![3.0, 4.0]], &[1.0])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { what: "responses", .. }));

        // Failed loads wrote nothing.
        assert_eq!(session.features().unwrap().row(0), vec![0.0, 0.0]);

        session
            .load(&[[1.0, 2.0], [3.0, 4.0]], &[5.0, 6.0])
            .unwrap();
        assert_eq!(session.features().unwrap().row(1), vec![3.0, 4.0]);
        assert_eq!(session.responses().unwrap().to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_replaced_buffers_do_not_resize_session() {
        let mut session = Session::<CpuBackend>::new();
        let handles = session.create(2, 2, 0.01, NO_REGULARIZATION).unwrap();
        *handles.features = Tensor2D::new(vec![1.0; 15], 5, 3);
        *handles.responses = Tensor1D::new(vec![1.0; 5]);
        *handles.theta = Theta::zeros(3);

        assert_eq!(session.n_features().unwrap(), 2);
        assert_eq!(session.n_observations().unwrap(), 2);
        let err = session.live().unwrap().check_shapes().unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                what: "feature rows",
                expected: 2,
                got: 5
            }
        ));

        let handles = session.handles().unwrap();
        *handles.features = Tensor2D::zeros(2, 2);
        *handles.responses = Tensor1D::zeros(2);
        let err = session.live().unwrap().check_shapes().unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                what: "theta coefficients",
                expected: 2,
                got: 3
            }
        ));

        *session.theta_mut().unwrap() = Theta::zeros(2);
        assert!(session.live().unwrap().check_shapes().is_ok());
    }

    #[test]
    fn test_from_config() {
        let mut session = Session::<CpuBackend>::new();
        let config = SessionConfig {
            echelon: 0.2,
            regularization: Regularization::L2(0.5),
            ..SessionConfig::new(3, 5)
        };
        let handles = session.from_config(&config).unwrap();
        assert_eq!(handles.features.shape(), (5, 3));

        let hp = session.hyperparameters().unwrap();
        assert_eq!(hp.echelon(), 0.2);
        assert_eq!(hp.regularization(), Regularization::L2(0.5));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Session::<CpuBackend>::new();
        let mut b = Session::<CpuBackend>::new();
        a.create(1, 1, 0.1, NO_REGULARIZATION).unwrap();
        b.create(2, 3, 0.2, 1.0).unwrap();

        a.destroy().unwrap();
        assert!(b.is_initialized());
        assert_eq!(b.n_features().unwrap(), 2);
    }
}
