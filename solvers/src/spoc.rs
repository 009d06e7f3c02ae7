use ndarray::Array1;
use regress_core::{
    BandCovariances, BandSelection, FilterBankMethod, FittedPipeline, PipelineError,
    RegressionPipeline, SpocParams,
};

use crate::diag::validate_bound_data;
use crate::error::{Result, SolverError};
use crate::solver::{Objective, Solver};

/// Variance threshold guarding the regression against degenerate projected
/// dimensions.
const VARIANCE_THRESHOLD: f64 = 1e-10;

/// The `SPoC` solver: supervised spatial projection per band, variance
/// filtering, standardization, and ridge regression with a cross-validated
/// alpha.
#[derive(Debug)]
pub struct SpocSolver {
    bands: BandSelection,
    rank_fraction: f64,
    objective: Option<Objective>,
    model: Option<FittedPipeline>,
}

impl SpocSolver {
    /// Display name in benchmark results.
    pub const NAME: &'static str = "SPoC";

    /// The rank fractions swept by the benchmark grid.
    pub const RANK_FRACTION_GRID: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 0.99];

    /// The band composites swept by the benchmark grid.
    pub const FREQUENCY_BAND_GRID: [&'static str; 1] = ["low"];

    /// Creates a solver for a band composite and a rank fraction.
    ///
    /// The projection rank itself is derived at `configure` time as
    /// `floor(rank_fraction * n_channels)`.
    ///
    /// # Errors
    /// Returns `SolverError::RankFractionOutOfRange` unless the fraction
    /// is in `(0, 1]`, and `SolverError::InvalidConfig` for bad band
    /// selections.
    pub fn new(frequency_bands: &str, rank_fraction: f64) -> Result<Self> {
        if !(rank_fraction > 0.0 && rank_fraction <= 1.0) {
            return Err(SolverError::RankFractionOutOfRange { got: rank_fraction });
        }
        let bands = BandSelection::parse(frequency_bands).map_err(SolverError::InvalidConfig)?;
        Ok(Self {
            bands,
            rank_fraction,
            objective: None,
            model: None,
        })
    }

    /// The configured band selection.
    pub fn bands(&self) -> &BandSelection {
        &self.bands
    }

    /// The configured rank fraction.
    pub fn rank_fraction(&self) -> f64 {
        self.rank_fraction
    }

    /// The projection rank this solver derives for a given channel count.
    pub fn derived_rank(&self, n_channels: usize) -> usize {
        (self.rank_fraction * n_channels as f64).floor() as usize
    }
}

impl Solver for SpocSolver {
    fn configure(&mut self, x: BandCovariances, y: Array1<f64>, n_channels: usize) -> Result<()> {
        validate_bound_data(&self.bands, &x, &y, n_channels)?;

        let rank = self.derived_rank(n_channels);
        if rank == 0 || rank > n_channels {
            return Err(SolverError::InvalidConfig(PipelineError::InvalidRank {
                rank,
                n_channels,
            }));
        }

        let pipeline = RegressionPipeline::new(
            self.bands.clone(),
            FilterBankMethod::Spoc(SpocParams::with_rank(rank)),
        )
        .with_variance_threshold(VARIANCE_THRESHOLD);
        log::debug!(
            "configured `{}` solver: bands {}, rank {rank} ({} of {n_channels} channel(s)), \
             {} sample(s)",
            Self::NAME,
            self.bands,
            self.rank_fraction,
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
