use ndarray::{Array2, Axis};

use crate::error::{PipelineError, Result};

/// Removes feature columns whose training-set variance falls below a
/// threshold, guarding the regression against degenerate dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceThreshold {
    threshold: f64,
}

impl VarianceThreshold {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Learns which columns survive from the training feature matrix.
    ///
    /// # Errors
    /// Returns `PipelineError::NoFeaturesLeft` when every column is below
    /// the threshold.
    pub fn fit(&self, x: &Array2<f64>) -> Result<FittedMask> {
        let n = x.nrows() as f64;
        let mut keep = Vec::new();

        for (j, col) in x.axis_iter(Axis(1)).enumerate() {
            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            if var >= self.threshold {
                keep.push(j);
            }
        }

        if keep.is_empty() {
            return Err(PipelineError::NoFeaturesLeft {
                threshold: self.threshold,
            });
        }

        let dropped = x.ncols() - keep.len();
        if dropped > 0 {
            log::debug!(
                "variance threshold {:e} dropped {dropped} of {} feature column(s)",
                self.threshold,
                x.ncols()
            );
        }

        Ok(FittedMask {
            keep,
            n_features_in: x.ncols(),
        })
    }
}

/// The learned column mask, reapplied verbatim at predict time.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedMask {
    keep: Vec<usize>,
    n_features_in: usize,
}

impl FittedMask {
    /// Selects the retained columns from a feature matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features_in {
            return Err(PipelineError::ShapeMismatch {
                what: "features",
                got: x.ncols(),
                expected: self.n_features_in,
            });
        }
        Ok(x.select(Axis(1), &self.keep))
    }

    /// Number of columns that survive the mask.
    pub fn n_kept(&self) -> usize {
        self.keep.len()
    }
}
