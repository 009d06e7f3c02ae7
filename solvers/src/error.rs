use std::fmt;

use regress_core::PipelineError;

/// The result type used throughout the solvers crate.
pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors produced by the benchmark solver plugins.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A solver parameter or the bound data is invalid; raised by
    /// construction or `configure`, always before any fitting starts.
    InvalidConfig(PipelineError),

    /// The rank fraction is outside `(0, 1]`.
    RankFractionOutOfRange { got: f64 },

    /// `fit` was called before `configure`.
    NotConfigured,

    /// `result` was called before a successful `fit`.
    NotFitted,

    /// The training pass failed in the numeric layer.
    Fit(PipelineError),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
            SolverError::RankFractionOutOfRange { got } => {
                write!(f, "rank fraction {got} is outside (0, 1]")
            }
            SolverError::NotConfigured => write!(f, "solver has not been configured"),
            SolverError::NotFitted => write!(f, "solver has not been fitted"),
            SolverError::Fit(err) => write!(f, "fitting failed: {err}"),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::InvalidConfig(err) | SolverError::Fit(err) => Some(err),
            _ => None,
        }
    }
}
