//! Benchmark solver plugins wrapping covariance-regression pipelines.
//!
//! Each solver binds training data with `configure`, trains in a single
//! pass with `fit`, and hands the fitted pipeline off through `result`.

mod diag;
mod error;
mod solver;
mod spoc;
mod test;

pub use diag::DiagSolver;
pub use error::{Result, SolverError};
pub use solver::{Solver, StoppingCriterion};
pub use spoc::SpocSolver;

use regress_core::FittedPipeline;

/// Declarative description of a solver and its hyperparameters, as a
/// benchmark harness would select them.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverSpec {
    /// Log-diagonal filter bank.
    Diag {
        /// Hyphen-delimited band composite, e.g. `"low-alpha"`.
        frequency_bands: String,
    },
    /// Supervised spatial projection (SPoC) filter bank.
    Spoc {
        /// Hyphen-delimited band composite.
        frequency_bands: String,
        /// Projection rank as a fraction of the channel count, in `(0, 1]`.
        rank: f64,
    },
}

/// Builds a solver from its spec.
pub fn from_spec(spec: &SolverSpec) -> Result<AnySolver> {
    Ok(match spec {
        SolverSpec::Diag { frequency_bands } => {
            AnySolver::Diag(DiagSolver::new(frequency_bands)?)
        }
        SolverSpec::Spoc {
            frequency_bands,
            rank,
        } => AnySolver::Spoc(SpocSolver::new(frequency_bands, *rank)?),
    })
}

/// Enum dispatch over the available solver plugins.
#[derive(Debug)]
pub enum AnySolver {
    Diag(DiagSolver),
    Spoc(SpocSolver),
}

impl AnySolver {
    /// The solver's display name, as shown in benchmark results.
    pub fn name(&self) -> &'static str {
        match self {
            AnySolver::Diag(_) => DiagSolver::NAME,
            AnySolver::Spoc(_) => SpocSolver::NAME,
        }
    }
}

impl Solver for AnySolver {
    fn configure(
        &mut self,
        x: regress_core::BandCovariances,
        y: ndarray::Array1<f64>,
        n_channels: usize,
    ) -> Result<()> {
        match self {
            AnySolver::Diag(s) => s.configure(x, y, n_channels),
            AnySolver::Spoc(s) => s.configure(x, y, n_channels),
        }
    }

    fn fit(&mut self, n_iter: usize) -> Result<()> {
        match self {
            AnySolver::Diag(s) => s.fit(n_iter),
            AnySolver::Spoc(s) => s.fit(n_iter),
        }
    }

    fn result(&self) -> Result<&FittedPipeline> {
        match self {
            AnySolver::Diag(s) => s.result(),
            AnySolver::Spoc(s) => s.result(),
        }
    }
}
