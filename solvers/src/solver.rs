use ndarray::Array1;
use regress_core::{BandCovariances, FittedPipeline};

use crate::error::Result;

/// How the harness should drive `fit`.
///
/// All solvers here train in one shot: the harness calls `fit` exactly once
/// and any iteration budget it passes along is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoppingCriterion {
    #[default]
    SingleRun,
}

/// The contract between the benchmark harness and a solver plugin.
///
/// The three calls form a strict sequence: `configure` binds training data
/// and derives pipeline parameters from the solver's fixed configuration,
/// `fit` performs one full training pass, and `result` hands off the
/// fitted pipeline for downstream scoring. `configure` is idempotent:
/// rebinding replaces any previous data and clears a stale model.
pub trait Solver {
    /// Binds training data and validates it against the configuration.
    ///
    /// # Errors
    /// Configuration-validation failures (absent band, channel-count or
    /// length mismatches, out-of-range projection rank) are reported here,
    /// before any fitting starts.
    fn configure(&mut self, x: BandCovariances, y: Array1<f64>, n_channels: usize) -> Result<()>;

    /// Performs the full pipeline fit.
    ///
    /// `n_iter` is accepted for harness compatibility and ignored; training
    /// is single-shot regardless of its value.
    ///
    /// # Errors
    /// Returns `SolverError::NotConfigured` without bound data, and
    /// propagates numeric failures from the pipeline as `SolverError::Fit`.
    fn fit(&mut self, n_iter: usize) -> Result<()>;

    /// Returns the fitted pipeline.
    ///
    /// # Errors
    /// Returns `SolverError::NotFitted` before a successful `fit`.
    fn result(&self) -> Result<&FittedPipeline>;

    /// The stopping criterion the harness should apply.
    fn stopping_criterion(&self) -> StoppingCriterion {
        StoppingCriterion::SingleRun
    }
}

/// Training data bound by `configure`, together with the pipeline derived
/// from it. Owned exclusively by one solver for the duration of one run.
#[derive(Debug)]
pub(crate) struct Objective {
    pub x: BandCovariances,
    pub y: Array1<f64>,
    pub pipeline: regress_core::RegressionPipeline,
}
