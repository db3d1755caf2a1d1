// trainer/mod.rs
use crate::{
    backend::Backend,
    config::{
        check_tolerance, TrainingConfig, DEFAULT_CONVERGENCE_TOLERANCE, DEFAULT_LOG_EVERY, DEFAULT_MAX_ITERATIONS,
    },
    diagnostics::{DiagnosticsSink, StdoutSink, TrainingLogger, Verbosity},
    error::{Error, Result},
    loss::Loss,
    model::Theta,
    optimizer::{self, GradientDescent, Optimizer},
    problem::{Problem, Session, SessionState},
    regularizers::Regularizer,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Runs batch gradient descent against a [`Session`].
///
/// The trainer holds only loop settings and the loss; the dataset,
/// hyperparameters and parameter vector live in the session passed to each
/// call, so one trainer can drive any number of sessions.
///
/// Built via [`TrainerBuilder`] or [`Trainer::from_config`].
pub struct Trainer<B, L>
where
    B: Backend,
    L: Loss<B>,
{
    pub(crate) max_iterations: usize,
    pub(crate) convergence_tolerance: f64,
    pub(crate) fit_intercept: bool,
    pub(crate) verbosity: Verbosity,
    pub(crate) log_every: usize,
    pub(crate) sink: Arc<dyn DiagnosticsSink>,
    pub(crate) loss_fn: L,
    _phantom_backend: PhantomData<B>,
}

/// Fluent builder for [`Trainer`].
///
/// Defaults:
/// - `max_iterations`: 1_000_000
/// - `convergence_tolerance`: 1e-9
/// - `fit_intercept`: true
/// - `verbosity`: [`Verbosity::Info`]
/// - `log_every`: 1000
/// - `sink`: [`StdoutSink`]
pub struct TrainerBuilder<B, L>
where
    B: Backend,
    L: Loss<B>,
{
    max_iterations: usize,
    convergence_tolerance: f64,
    fit_intercept: bool,
    verbosity: Verbosity,
    log_every: usize,
    sink: Arc<dyn DiagnosticsSink>,
    loss_fn: L,
    _phantom_backend: PhantomData<B>,
}

impl<B, L> TrainerBuilder<B, L>
where
    B: Backend,
    L: Loss<B>,
{
    /// Starts a builder for the given loss (e.g. `SquaredError` or `SigmoidLinked`).
    pub fn new(loss_fn: L) -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
            fit_intercept: true,
            verbosity: Verbosity::default(),
            log_every: DEFAULT_LOG_EVERY,
            sink: Arc::new(StdoutSink),
            loss_fn,
            _phantom_backend: PhantomData,
        }
    }

    /// Iteration cap. With 0, `train` returns immediately with
    /// [`Error::MaxIterationsExceeded`].
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Training stops once no parameter moves by more than `tolerance` in
    /// one iteration. Independent of the learning rate.
    ///
    /// Negative or non-finite values make `train` fail with
    /// [`Error::InvalidHyperparameter`].
    pub fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    /// When `false`, the intercept stays at its starting value.
    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Progress is reported every `every` iterations at [`Verbosity::Info`].
    /// 0 turns periodic progress off.
    pub fn log_every(mut self, every: usize) -> Self {
        self.log_every = every;
        self
    }

    pub fn sink<S: DiagnosticsSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Like [`TrainerBuilder::sink`], for a sink shared with other trainers.
    pub fn shared_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Copies every loop setting from `config`.
    pub fn config(self, config: &TrainingConfig) -> Self {
        self.max_iterations(config.max_iterations)
            .convergence_tolerance(config.convergence_tolerance)
            .fit_intercept(config.fit_intercept)
            .verbosity(config.verbosity)
            .log_every(config.log_every)
    }

    pub fn build(self) -> Trainer<B, L> {
        Trainer {
            max_iterations: self.max_iterations,
            convergence_tolerance: self.convergence_tolerance,
            fit_intercept: self.fit_intercept,
            verbosity: self.verbosity,
            log_every: self.log_every,
            sink: self.sink,
            loss_fn: self.loss_fn,
            _phantom_backend: PhantomData,
        }
    }
}

impl<B, L> Trainer<B, L>
where
    B: Backend,
    L: Loss<B>,
{
    /// Convenience constructor that starts the builder pattern.
    pub fn builder(loss_fn: L) -> TrainerBuilder<B, L> {
        TrainerBuilder::new(loss_fn)
    }

    /// Validated construction from a [`TrainingConfig`], logging to stdout.
    pub fn from_config(loss_fn: L, config: &TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(TrainerBuilder::new(loss_fn).config(config).build())
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn convergence_tolerance(&self) -> f64 {
        self.convergence_tolerance
    }

    /// Gradient of the session's cost at `theta`.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] without a live problem,
    /// [`Error::ShapeMismatch`] if a session buffer no longer matches the
    /// dimensions it was created with, otherwise see
    /// [`optimizer::compute_gradient`].
    pub fn compute_gradient(&self, session: &Session<B>, theta: &Theta<B>) -> Result<Theta<B>> {
        let problem = session.live()?;
        problem.check_shapes()?;
        optimizer::compute_gradient(
            &problem.features,
            &problem.responses,
            theta,
            &self.loss_fn,
            self.fit_intercept,
        )
    }

    /// One gradient descent update of `theta` with the session's
    /// hyperparameters. Neither the session nor `theta` is modified.
    pub fn step(&self, session: &Session<B>, theta: &Theta<B>) -> Result<Theta<B>> {
        let problem = session.live()?;
        let gradient = self.compute_gradient(session, theta)?;
        let optimizer =
            GradientDescent::from_hyperparameters(&problem.hyperparameters, problem.n_observations());
        Ok(optimizer.step(theta, &gradient))
    }

    /// Iterates from the session's theta buffer until convergence or the
    /// iteration cap.
    ///
    /// On convergence the learned parameters are written back to the session
    /// (state [`SessionState::Converged`]) and returned.
    ///
    /// # Errors
    /// - [`Error::NotInitialized`] without a live problem.
    /// - [`Error::SessionFinished`] if the session already finished a run.
    /// - [`Error::ShapeMismatch`] if a buffer was replaced with one that does
    ///   not match the session's dimensions; nothing is modified.
    /// - [`Error::MaxIterationsExceeded`] when the cap is hit. The last
    ///   parameters are carried in the error and written back to the session,
    ///   whose state becomes [`SessionState::MaxIterationsExceeded`].
    /// - [`Error::GradientComputationFailed`] on a non-finite gradient. The
    ///   session stays [`SessionState::Initialized`] with its theta buffer
    ///   untouched, so it can be fixed and trained again.
    pub fn train<'s>(&self, session: &'s mut Session<B>) -> Result<&'s Theta<B>> {
        check_tolerance(self.convergence_tolerance)?;
        let problem = session.live_mut()?;
        match problem.state {
            SessionState::Initialized => {}
            SessionState::Uninitialized => return Err(Error::NotInitialized),
            state => return Err(Error::SessionFinished { state }),
        }
        problem.check_shapes()?;

        let n_observations = problem.n_observations();
        let optimizer = GradientDescent::from_hyperparameters(&problem.hyperparameters, n_observations);
        let logger = TrainingLogger::new(self.verbosity, Arc::clone(&self.sink));
        logger.start_training(
            problem.n_features(),
            n_observations,
            optimizer.echelon(),
            optimizer.regularization(),
            self.max_iterations,
            self.convergence_tolerance,
        );

        let mut theta = problem.theta.clone();
        let mut last_delta = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            let gradient = match optimizer::compute_gradient(
                &problem.features,
                &problem.responses,
                &theta,
                &self.loss_fn,
                self.fit_intercept,
            ) {
                Ok(gradient) => gradient,
                Err(Error::GradientComputationFailed { reason, .. }) => {
                    logger.gradient_failed(iteration, &reason);
                    return Err(Error::GradientComputationFailed { iteration, reason });
                }
                Err(e) => return Err(e),
            };

            let next = optimizer.step(&theta, &gradient);
            last_delta = theta.max_abs_diff(&next);
            theta = next;

            let periodic = self.log_every != 0 && iteration % self.log_every == 0;
            let level = if periodic {
                Verbosity::Info
            } else {
                Verbosity::Debug
            };
            if logger.enabled(level) {
                let cost = self.cost(problem, &theta, &optimizer);
                logger.log_iteration(iteration, last_delta, cost, periodic);
            }

            if last_delta <= self.convergence_tolerance {
                problem.theta = theta;
                problem.state = SessionState::Converged;
                problem.iterations = iteration;
                logger.converged(iteration, &problem.theta.to_vec());
                return Ok(&problem.theta);
            }
        }

        problem.theta = theta;
        problem.state = SessionState::MaxIterationsExceeded;
        problem.iterations = self.max_iterations;
        logger.max_iterations_exceeded(self.max_iterations, last_delta);
        Err(Error::MaxIterationsExceeded {
            iterations: self.max_iterations,
            theta: problem.theta.to_vec(),
        })
    }

    /// Penalized cost at `theta`, for progress lines only.
    fn cost(&self, problem: &Problem<B>, theta: &Theta<B>, optimizer: &GradientDescent<B>) -> f64 {
        let z = theta.linear_combination(&problem.features);
        let data_cost = self.loss_fn.loss(&z, &problem.responses);
        let penalty = optimizer
            .regularization()
            .penalty(theta, problem.n_observations());
        (data_cost + penalty).to_f64()
    }
}

impl<B, L> std::fmt::Debug for Trainer<B, L>
where
    B: Backend,
    L: Loss<B>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("loss", &self.loss_fn.name())
            .field("max_iterations", &self.max_iterations)
            .field("convergence_tolerance", &self.convergence_tolerance)
            .field("fit_intercept", &self.fit_intercept)
            .field("verbosity", &self.verbosity)
            .field("log_every", &self.log_every)
            .finish_non_exhaustive()
    }
}
