//! Error type shared by every fallible operation in the crate.

use crate::problem::SessionState;

/// Errors raised by session management, training and configuration loading.
///
/// Usage errors (`AlreadyInitialized`, `NotInitialized`, `InvalidDimensions`,
/// `InvalidHyperparameter`, `ShapeMismatch`) are reported before any state is
/// touched, so the session they were raised against is left exactly as it
/// was.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a problem is already initialized; destroy it before creating a new one")]
    AlreadyInitialized,

    #[error("no problem is initialized")]
    NotInitialized,

    #[error("invalid dimensions: n_features = {n_features}, n_observations = {n_observations} (both must be > 0)")]
    InvalidDimensions {
        n_features: usize,
        n_observations: usize,
    },

    #[error("invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// The iteration cap was reached before convergence.
    ///
    /// `theta` holds the parameters after the last completed iteration (the
    /// starting point when the cap is 0). The same values are also written
    /// back to the session.
    #[error("maximum number of iterations exceeded after {iterations} iterations")]
    MaxIterationsExceeded { iterations: usize, theta: Vec<f64> },

    #[error("gradient computation failed at iteration {iteration}: {reason}")]
    GradientComputationFailed { iteration: usize, reason: String },

    #[error("training already finished with state {state:?}; destroy and recreate the problem to train again")]
    SessionFinished { state: SessionState },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::InvalidDimensions {
            n_features: 0,
            n_observations: 3,
        };
        assert!(err.to_string().contains("n_features = 0"));

        let err = Error::MaxIterationsExceeded {
            iterations: 10,
            theta: vec![0.0, 1.0],
        };
        assert_eq!(
            err.to_string(),
            "maximum number of iterations exceeded after 10 iterations"
        );

        let err = Error::SessionFinished {
            state: SessionState::Converged,
        };
        assert!(err.to_string().contains("Converged"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
