use ndarray::{Array2, Array3};

use crate::bands::FrequencyBand;
use crate::error::{PipelineError, Result};

/// Maps each covariance matrix in a band block to `ln(diag(C))`.
///
/// Output is `(n_samples, n_channels)`. Positive-definite input guarantees
/// a strictly positive diagonal; anything else is reported as a fitting
/// failure rather than producing NaN features.
pub fn log_diagonal(band: FrequencyBand, block: &Array3<f64>) -> Result<Array2<f64>> {
    let (n, c, _) = block.dim();
    let mut out = Array2::zeros((n, c));

    for (i, cov) in block.outer_iter().enumerate() {
        for j in 0..c {
            let power = cov[[j, j]];
            if power <= 0.0 {
                return Err(PipelineError::NonPositiveVariance { band, channel: j });
            }
            out[[i, j]] = power.ln();
        }
    }

    Ok(out)
}
