use ndarray::{Array1, Array2, Axis};

use crate::bands::{BandSelection, FrequencyBand};
use crate::error::{PipelineError, Result};
use crate::features::BandCovariances;
use crate::ridge::{FittedRidge, RidgeCv};
use crate::scale::{FittedScaler, StandardScaler};
use crate::select::{FittedMask, VarianceThreshold};
use crate::transform::{log_diagonal, FilterBankMethod, SpocFilters};

/// A configured but unfitted regression pipeline.
///
/// Stages, in order: band selection/labeling, the filter-bank transform,
/// optional variance thresholding, standardization, and ridge regression
/// with a cross-validated alpha. Configuration is immutable once built;
/// `fit` produces a separate `FittedPipeline` artifact.
#[derive(Debug, Clone)]
pub struct RegressionPipeline {
    bands: BandSelection,
    method: FilterBankMethod,
    variance_threshold: Option<f64>,
    ridge: RidgeCv,
}

impl RegressionPipeline {
    pub fn new(bands: BandSelection, method: FilterBankMethod) -> Self {
        Self {
            bands,
            method,
            variance_threshold: None,
            ridge: RidgeCv::default(),
        }
    }

    /// Enables the variance-filtering stage between the filter bank and
    /// the scaler.
    pub fn with_variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = Some(threshold);
        self
    }

    /// Replaces the default regularization grid.
    pub fn with_ridge(mut self, ridge: RidgeCv) -> Self {
        self.ridge = ridge;
        self
    }

    /// The configured band selection.
    pub fn bands(&self) -> &BandSelection {
        &self.bands
    }

    /// Runs the full training pass and returns the fitted artifact.
    ///
    /// # Errors
    /// Configuration-level mismatches (missing band, bad shapes) and
    /// numeric failures (non-positive-definite covariance, degenerate
    /// projections) all surface here; nothing is retried.
    pub fn fit(&self, x: &BandCovariances, y: &Array1<f64>) -> Result<FittedPipeline> {
        if y.len() != x.n_samples() {
            return Err(PipelineError::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: x.n_samples(),
            });
        }

        let mut transforms = Vec::with_capacity(self.bands.len());
        let mut band_features = Vec::with_capacity(self.bands.len());
        for &band in self.bands.bands() {
            let block = x.block(band)?;
            let (fitted, features) = match &self.method {
                FilterBankMethod::Diag => {
                    (FittedBandTransform::Diag, log_diagonal(band, block)?)
                }
                FilterBankMethod::Spoc(params) => {
                    let filters = SpocFilters::fit(band, block, y, params)?;
                    let features = filters.transform(band, block)?;
                    (FittedBandTransform::Spoc(filters), features)
                }
            };
            transforms.push((band, fitted));
            band_features.push(features);
        }

        let features = concat_features(&band_features)?;
        log::debug!(
            "filter bank produced {} feature(s) from {} band(s)",
            features.ncols(),
            transforms.len()
        );

        let (mask, features) = match self.variance_threshold {
            Some(threshold) => {
                let mask = VarianceThreshold::new(threshold).fit(&features)?;
                let filtered = mask.transform(&features)?;
                (Some(mask), filtered)
            }
            None => (None, features),
        };

        let scaler = StandardScaler::fit(&features)?;
        let features = scaler.transform(&features)?;
        let ridge = self.ridge.fit(&features, y)?;

        Ok(FittedPipeline {
            bands: self.bands.clone(),
            transforms,
            mask,
            scaler,
            ridge,
        })
    }
}

/// Per-band fitted state of the filter-bank stage.
#[derive(Debug, Clone)]
enum FittedBandTransform {
    Diag,
    Spoc(SpocFilters),
}

impl FittedBandTransform {
    fn apply(&self, band: FrequencyBand, block: &ndarray::Array3<f64>) -> Result<Array2<f64>> {
        match self {
            FittedBandTransform::Diag => log_diagonal(band, block),
            FittedBandTransform::Spoc(filters) => filters.transform(band, block),
        }
    }
}

/// The trained pipeline: transform parameters plus regression coefficients.
///
/// This is the solver's result artifact; it owns everything needed to score
/// held-out data through `predict`.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    bands: BandSelection,
    transforms: Vec<(FrequencyBand, FittedBandTransform)>,
    mask: Option<FittedMask>,
    scaler: FittedScaler,
    ridge: FittedRidge,
}

impl FittedPipeline {
    /// Replays the frozen stages on new data and predicts targets.
    pub fn predict(&self, x: &BandCovariances) -> Result<Array1<f64>> {
        let mut band_features = Vec::with_capacity(self.transforms.len());
        for (band, transform) in &self.transforms {
            let block = x.block(*band)?;
            band_features.push(transform.apply(*band, block)?);
        }

        let features = concat_features(&band_features)?;
        let features = match &self.mask {
            Some(mask) => mask.transform(&features)?,
            None => features,
        };
        let features = self.scaler.transform(&features)?;
        self.ridge.predict(&features)
    }

    /// The band selection the model was trained with.
    pub fn bands(&self) -> &BandSelection {
        &self.bands
    }

    /// The fitted regression head.
    pub fn ridge(&self) -> &FittedRidge {
        &self.ridge
    }

    /// Number of features entering the regression (after masking).
    pub fn n_features(&self) -> usize {
        self.ridge.coef().len()
    }
}

fn concat_features(blocks: &[Array2<f64>]) -> Result<Array2<f64>> {
    if blocks.is_empty() {
        return Err(PipelineError::EmptySelection);
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    ndarray::concatenate(Axis(1), &views)
        .map_err(|_| PipelineError::Numeric("feature concatenation"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform::SpocParams;
    use ndarray::{Array1, Array3};

    // Diagonal covariances whose channel log-powers are linear in y, so a
    // diag pipeline can reconstruct the target almost exactly.
    fn linear_block(y: &Array1<f64>, c: usize, gain: f64) -> Array3<f64> {
        let n = y.len();
        let mut block = Array3::zeros((n, c, c));
        for i in 0..n {
            for j in 0..c {
                let slope = gain * (j + 1) as f64;
                block[[i, j, j]] = (slope * y[i]).exp();
            }
        }
        block
    }

    fn targets(n: usize) -> Array1<f64> {
        Array1::from_shape_fn(n, |i| (i as f64 / n as f64) * 2.0 - 1.0)
    }

    #[test]
    fn diag_round_trip_reconstructs_targets() {
        let y = targets(24);
        let x = BandCovariances::from_blocks([
            (FrequencyBand::Low, linear_block(&y, 3, 0.8)),
            (FrequencyBand::Alpha, linear_block(&y, 3, 0.3)),
        ])
        .unwrap();

        let pipeline = RegressionPipeline::new(
            BandSelection::parse("low-alpha").unwrap(),
            FilterBankMethod::Diag,
        );
        let model = pipeline.fit(&x, &y).unwrap();

        // 3 channels per band, two bands.
        assert_eq!(model.n_features(), 6);

        let y_pred = model.predict(&x).unwrap();
        let rmse = ((&y_pred - &y).mapv(|v| v * v).sum() / y.len() as f64).sqrt();
        assert!(rmse < 1e-2, "rmse {rmse}");
    }

    #[test]
    fn fit_fails_when_a_configured_band_is_absent() {
        let y = targets(8);
        let x =
            BandCovariances::from_blocks([(FrequencyBand::Low, linear_block(&y, 2, 1.0))]).unwrap();

        let pipeline = RegressionPipeline::new(
            BandSelection::parse("low-alpha").unwrap(),
            FilterBankMethod::Diag,
        );
        assert_eq!(
            pipeline.fit(&x, &y).unwrap_err(),
            PipelineError::MissingBand {
                band: FrequencyBand::Alpha
            }
        );
    }

    #[test]
    fn variance_threshold_stage_drops_flat_features() {
        let y = targets(16);
        let n = y.len();

        // Channel 0 carries signal; channel 1 is identical in every sample.
        let mut block = Array3::zeros((n, 2, 2));
        for i in 0..n {
            block[[i, 0, 0]] = (0.7 * y[i]).exp();
            block[[i, 1, 1]] = 2.0;
        }
        let x = BandCovariances::from_blocks([(FrequencyBand::Low, block)]).unwrap();

        let pipeline = RegressionPipeline::new(
            BandSelection::parse("low").unwrap(),
            FilterBankMethod::Diag,
        )
        .with_variance_threshold(1e-10);
        let model = pipeline.fit(&x, &y).unwrap();

        assert_eq!(model.n_features(), 1);
        let y_pred = model.predict(&x).unwrap();
        let rmse = ((&y_pred - &y).mapv(|v| v * v).sum() / n as f64).sqrt();
        assert!(rmse < 1e-2, "rmse {rmse}");
    }

    #[test]
    fn spoc_pipeline_round_trip() {
        let y = targets(30);
        let n = y.len();
        let c = 5;

        // Off-diagonal structure plus one target-modulated direction.
        let mut block = Array3::zeros((n, c, c));
        for i in 0..n {
            for j in 0..c {
                block[[i, j, j]] = 1.0;
            }
            for j in 0..c - 1 {
                block[[i, j, j + 1]] = 0.2;
                block[[i, j + 1, j]] = 0.2;
            }
            block[[i, 0, 0]] += (1.2 * y[i]).exp();
        }
        let x = BandCovariances::from_blocks([(FrequencyBand::Low, block)]).unwrap();

        let pipeline = RegressionPipeline::new(
            BandSelection::parse("low").unwrap(),
            FilterBankMethod::Spoc(SpocParams::with_rank(2)),
        )
        .with_variance_threshold(1e-10);
        let model = pipeline.fit(&x, &y).unwrap();

        assert!(model.n_features() <= 2);
        let y_pred = model.predict(&x).unwrap();
        let rmse = ((&y_pred - &y).mapv(|v| v * v).sum() / n as f64).sqrt();
        assert!(rmse < 0.3, "rmse {rmse}");
    }

    #[test]
    fn refitting_is_deterministic() {
        let y = targets(12);
        let x = BandCovariances::from_blocks([(FrequencyBand::Theta, linear_block(&y, 3, 0.5))])
            .unwrap();

        let pipeline = RegressionPipeline::new(
            BandSelection::parse("theta").unwrap(),
            FilterBankMethod::Diag,
        );
        let a = pipeline.fit(&x, &y).unwrap();
        let b = pipeline.fit(&x, &y).unwrap();
        assert_eq!(a.ridge().coef(), b.ridge().coef());
        assert_eq!(a.ridge().alpha(), b.ridge().alpha());
    }
}
