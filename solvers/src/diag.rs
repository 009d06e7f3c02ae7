use ndarray::Array1;
use regress_core::{
    BandCovariances, BandSelection, FilterBankMethod, FittedPipeline, RegressionPipeline,
};

use crate::error::{Result, SolverError};
use crate::solver::{Objective, Solver};

/// The `diag` solver: log-diagonal filter bank, standardization, and
/// ridge regression with a cross-validated alpha.
#[derive(Debug)]
pub struct DiagSolver {
    bands: BandSelection,
    objective: Option<Objective>,
    model: Option<FittedPipeline>,
}

impl DiagSolver {
    /// Display name in benchmark results.
    pub const NAME: &'static str = "diag";

    /// The band composites swept by the benchmark grid.
    pub const FREQUENCY_BAND_GRID: [&'static str; 2] = ["low", "low-alpha"];

    /// Creates a solver for a hyphen-delimited band composite.
    ///
    /// # Errors
    /// Returns `SolverError::InvalidConfig` for unknown, duplicate, or
    /// empty band selections.
    pub fn new(frequency_bands: &str) -> Result<Self> {
        let bands = BandSelection::parse(frequency_bands).map_err(SolverError::InvalidConfig)?;
        Ok(Self {
            bands,
            objective: None,
            model: None,
        })
    }

    /// The configured band selection.
    pub fn bands(&self) -> &BandSelection {
        &self.bands
    }
}

impl Solver for DiagSolver {
    fn configure(&mut self, x: BandCovariances, y: Array1<f64>, n_channels: usize) -> Result<()> {
        validate_bound_data(&self.bands, &x, &y, n_channels)?;

        let pipeline = RegressionPipeline::new(self.bands.clone(), FilterBankMethod::Diag);
        log::debug!(
            "configured `{}` solver: bands {}, {} sample(s), {n_channels} channel(s)",
            Self::NAME,
            self.bands,
            x.n_samples()
        );

        self.model = None;
        self.objective = Some(Objective { x, y, pipeline });
        Ok(())
    }

    fn fit(&mut self, _n_iter: usize) -> Result<()> {
        let objective = self.objective.as_ref().ok_or(SolverError::NotConfigured)?;
        let model = objective
            .pipeline
            .fit(&objective.x, &objective.y)
            .map_err(SolverError::Fit)?;
        self.model = Some(model);
        Ok(())
    }

    fn result(&self) -> Result<&FittedPipeline> {
        self.model.as_ref().ok_or(SolverError::NotFitted)
    }
}

/// Shared `configure`-time validation: shapes first, then band presence,
/// so every failure surfaces before fitting starts.
pub(crate) fn validate_bound_data(
    bands: &BandSelection,
    x: &BandCovariances,
    y: &Array1<f64>,
    n_channels: usize,
) -> Result<()> {
    use regress_core::PipelineError;

    if n_channels == 0 || x.n_channels() != n_channels {
        return Err(SolverError::InvalidConfig(PipelineError::ShapeMismatch {
            what: "channels",
            got: x.n_channels(),
            expected: n_channels,
        }));
    }
    if y.len() != x.n_samples() {
        return Err(SolverError::InvalidConfig(PipelineError::ShapeMismatch {
            what: "targets",
            got: y.len(),
            expected: x.n_samples(),
        }));
    }
    for &band in bands.bands() {
        if !x.contains(band) {
            return Err(SolverError::InvalidConfig(PipelineError::MissingBand {
                band,
            }));
        }
    }
    Ok(())
}
