use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};

/// Standardizes features to zero mean and unit variance, with statistics
/// computed from training data only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Computes per-column mean and scale from the training matrix.
    pub fn fit(x: &Array2<f64>) -> Result<FittedScaler> {
        let n = x.nrows();
        if n == 0 {
            return Err(PipelineError::TooFewSamples { got: 0, min: 1 });
        }

        let mut mean = Array1::zeros(x.ncols());
        let mut scale = Array1::zeros(x.ncols());
        for (j, col) in x.axis_iter(Axis(1)).enumerate() {
            let m = col.sum() / n as f64;
            let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64;
            mean[j] = m;
            // Constant columns pass through centered but unscaled.
            scale[j] = if var == 0.0 { 1.0 } else { var.sqrt() };
        }

        Ok(FittedScaler { mean, scale })
    }
}

/// Per-column statistics learned by `StandardScaler::fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl FittedScaler {
    /// Applies `(x - mean) / scale` column-wise.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::ShapeMismatch {
                what: "features",
                got: x.ncols(),
                expected: self.mean.len(),
            });
        }
        Ok((x - &self.mean) / &self.scale)
    }
}
