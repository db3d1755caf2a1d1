//! Run configuration.
//!
//! [`TrainingConfig`] mirrors the knobs of [`TrainerBuilder`](crate::trainer::TrainerBuilder)
//! and [`SessionConfig`] the arguments of [`Session::create`](crate::problem::Session::create).
//! With the `serde` feature both load from a JSON document:
//!
//! ```json
//! {
//!   "session": { "n_features": 4, "n_observations": 4, "echelon": 0.5, "regularization": "none" },
//!   "training": { "max_iterations": 100000, "convergence_tolerance": 1e-10 }
//! }
//! ```
//!
//! Missing fields fall back to their defaults.

use crate::diagnostics::Verbosity;
use crate::error::{Error, Result};
use crate::problem::{Hyperparameters, DEFAULT_ECHELON};
use crate::regularizers::Regularization;

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;
/// Default convergence tolerance on `max |theta - theta'|`.
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-9;
/// Default progress reporting period, in iterations.
pub const DEFAULT_LOG_EVERY: usize = 1000;

/// Rejects negative and non-finite tolerances.
pub(crate) fn check_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(Error::InvalidHyperparameter {
            name: "convergence_tolerance",
            value: tolerance,
        });
    }
    Ok(())
}

/// Settings of the convergence loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TrainingConfig {
    pub max_iterations: usize,
    pub convergence_tolerance: f64,
    pub fit_intercept: bool,
    pub verbosity: Verbosity,
    /// Progress period in iterations; 0 turns periodic progress off.
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
            fit_intercept: true,
            verbosity: Verbosity::default(),
            log_every: DEFAULT_LOG_EVERY,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        check_tolerance(self.convergence_tolerance)
    }
}

/// Dimensions and hyperparameters of a problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct SessionConfig {
    pub n_features: usize,
    pub n_observations: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_echelon"))]
    pub echelon: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub regularization: Regularization,
}

#[cfg(feature = "serde")]
fn default_echelon() -> f64 {
    DEFAULT_ECHELON
}

impl SessionConfig {
    /// Config with the default echelon and no regularization.
    pub fn new(n_features: usize, n_observations: usize) -> Self {
        Self {
            n_features,
            n_observations,
            echelon: DEFAULT_ECHELON,
            regularization: Regularization::None,
        }
    }

    pub fn hyperparameters(&self) -> Result<Hyperparameters> {
        Hyperparameters::with_regularization(self.echelon, self.regularization)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 || self.n_observations == 0 {
            return Err(Error::InvalidDimensions {
                n_features: self.n_features,
                n_observations: self.n_observations,
            });
        }
        self.hyperparameters().map(|_| ())
    }
}

/// A complete run description: the problem plus the loop settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct Config {
    pub session: SessionConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub training: TrainingConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.training.validate()
    }
}

#[cfg(feature = "serde")]
impl Config {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.max_iterations, 1_000_000);
        assert_eq!(config.convergence_tolerance, 1e-9);
        assert!(config.fit_intercept);
        assert_eq!(config.verbosity, Verbosity::Info);
        assert_eq!(config.log_every, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_training_validate_rejects_bad_values() {
        let config = TrainingConfig {
            convergence_tolerance: -1.0,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidHyperparameter {
                name: "convergence_tolerance",
                ..
            })
        ));

        let config = TrainingConfig {
            convergence_tolerance: f64::NAN,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());

        // 0 disables periodic progress.
        let config = TrainingConfig {
            log_every: 0,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_config_validate() {
        assert!(SessionConfig::new(4, 4).validate().is_ok());
        assert!(matches!(
            SessionConfig::new(0, 4).validate(),
            Err(Error::InvalidDimensions { .. })
        ));

        let mut config = SessionConfig::new(2, 2);
        config.echelon = 0.0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidHyperparameter { name: "echelon", .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_str_fills_defaults() {
        let config = Config::from_json_str(
            r#"{
                "session": { "n_features": 4, "n_observations": 4, "echelon": 0.5 },
                "training": { "convergence_tolerance": 1e-10, "verbosity": "silent" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.session.echelon, 0.5);
        assert_eq!(config.session.regularization, Regularization::None);
        assert_eq!(config.training.convergence_tolerance, 1e-10);
        assert_eq!(config.training.verbosity, Verbosity::Silent);
        assert_eq!(config.training.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_str_rejects_invalid() {
        let err = Config::from_json_str(r#"{ "session": { "n_features": 0, "n_observations": 1 } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));

        let err = Config::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let err = Config::from_json_str(
            r#"{ "session": { "n_features": 1, "n_observations": 1, "regularization": { "l2": -1.0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidHyperparameter { name: "lambda", .. }));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_path_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let config = Config {
            session: SessionConfig {
                regularization: Regularization::L2(0.1),
                ..SessionConfig::new(3, 10)
            },
            training: TrainingConfig {
                max_iterations: 50,
                ..TrainingConfig::default()
            },
        };
        std::fs::write(&path, config.to_json_string().unwrap()).unwrap();

        assert_eq!(Config::from_path(&path).unwrap(), config);
        assert!(matches!(
            Config::from_path(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
