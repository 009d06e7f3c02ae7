//! Pipeline primitives for regression on covariance-derived M/EEG features.
//!
//! This crate provides the statistical building blocks that the benchmark
//! solvers compose: frequency-band bookkeeping, filter-bank transforms
//! (log-diagonal and SPoC), variance-based feature filtering,
//! standardization, and ridge regression with a cross-validated
//! regularization strength.

mod bands;
mod error;
mod features;
mod pipeline;
mod ridge;
mod scale;
mod select;
mod transform;

pub use bands::{BandSelection, FrequencyBand};
pub use error::{PipelineError, Result};
pub use features::BandCovariances;
pub use pipeline::{FittedPipeline, RegressionPipeline};
pub use ridge::{log_alpha_grid, FittedRidge, RidgeCv};
pub use scale::{FittedScaler, StandardScaler};
pub use select::{FittedMask, VarianceThreshold};
pub use transform::{FilterBankMethod, SpocFilters, SpocParams};
