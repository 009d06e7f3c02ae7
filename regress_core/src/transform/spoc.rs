use std::cmp::Ordering;

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Array3, ArrayView2};

use crate::bands::FrequencyBand;
use crate::error::{PipelineError, Result};

/// Parameters of the supervised spatial projection.
#[derive(Debug, Clone, PartialEq)]
pub struct SpocParams {
    /// Number of spatial components to keep.
    pub n_components: usize,
    /// Multiplier applied to the learned filters.
    pub scale: f64,
    /// Trace-normalized shrinkage applied to the mean covariance, in `[0, 1)`.
    pub shrinkage: f64,
}

impl SpocParams {
    /// Parameters with the benchmark's fixed scale (1) and shrinkage (0).
    pub fn with_rank(n_components: usize) -> Self {
        Self {
            n_components,
            scale: 1.0,
            shrinkage: 0.0,
        }
    }
}

/// Fitted SPoC spatial filters for one frequency band.
///
/// SPoC seeks spatial projections whose band power co-modulates with the
/// target: it solves the generalized eigenproblem between the
/// target-weighted mean covariance and the plain mean covariance, keeping
/// the components with the largest absolute eigenvalues.
#[derive(Debug, Clone)]
pub struct SpocFilters {
    // (n_channels, n_components), one filter per column.
    filters: Array2<f64>,
}

impl SpocFilters {
    /// Learns spatial filters from a band block and aligned targets.
    ///
    /// # Errors
    /// Fails when the rank is outside `[1, n_channels]`, the target is
    /// constant, or the mean covariance is not positive definite.
    pub fn fit(
        band: FrequencyBand,
        block: &Array3<f64>,
        y: &Array1<f64>,
        params: &SpocParams,
    ) -> Result<Self> {
        let (n, c, _) = block.dim();
        let k = params.n_components;
        if k == 0 || k > c {
            return Err(PipelineError::InvalidRank {
                rank: k,
                n_channels: c,
            });
        }
        if y.len() != n {
            return Err(PipelineError::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: n,
            });
        }

        // Standardize the target so it acts as a zero-mean, unit-variance
        // weight over samples.
        let y_mean = y.sum() / n as f64;
        let y_var = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / n as f64;
        if y_var == 0.0 {
            return Err(PipelineError::ConstantTarget);
        }
        let y_std = y_var.sqrt();

        let mut c_mean = Array2::<f64>::zeros((c, c));
        let mut c_weighted = Array2::<f64>::zeros((c, c));
        for (i, cov) in block.outer_iter().enumerate() {
            c_mean += &cov;
            c_weighted.scaled_add((y[i] - y_mean) / y_std, &cov);
        }
        c_mean /= n as f64;
        c_weighted /= n as f64;

        if params.shrinkage > 0.0 {
            let trace_scale = c_mean.diag().sum() / c as f64;
            c_mean *= 1.0 - params.shrinkage;
            for j in 0..c {
                c_mean[[j, j]] += params.shrinkage * trace_scale;
            }
        }

        // Whitening transform from the eigendecomposition of the mean
        // covariance; a non-positive eigenvalue means the input covariances
        // were not positive definite.
        let eig = SymmetricEigen::new(to_dmatrix(&c_mean.view()));
        for &value in eig.eigenvalues.iter() {
            if value <= 0.0 {
                return Err(PipelineError::NotPositiveDefinite {
                    band,
                    eigenvalue: value,
                });
            }
        }
        let inv_sqrt_diag = DMatrix::from_diagonal(&eig.eigenvalues.map(|v| v.powf(-0.5)));
        let whitener = &eig.eigenvectors * inv_sqrt_diag * eig.eigenvectors.transpose();

        let mut whitened = &whitener * to_dmatrix(&c_weighted.view()) * &whitener;
        // Symmetrize against round-off before the second eigendecomposition.
        whitened = (&whitened + &whitened.transpose()) * 0.5;
        let eig_w = SymmetricEigen::new(whitened);

        // Rank components by |eigenvalue|: both strongly positive and
        // strongly negative co-modulation are informative.
        let mut order: Vec<usize> = (0..c).collect();
        order.sort_by(|&a, &b| {
            eig_w.eigenvalues[b]
                .abs()
                .partial_cmp(&eig_w.eigenvalues[a].abs())
                .unwrap_or(Ordering::Equal)
        });

        let mut filters = Array2::zeros((c, k));
        for (j, &idx) in order.iter().take(k).enumerate() {
            let filter = &whitener * eig_w.eigenvectors.column(idx);
            for r in 0..c {
                filters[[r, j]] = filter[r] * params.scale;
            }
        }

        log::debug!(
            "fitted {k} SPoC component(s) for band `{band}` over {n} samples"
        );

        Ok(Self { filters })
    }

    /// Number of spatial components.
    pub fn n_components(&self) -> usize {
        self.filters.ncols()
    }

    /// Projects each covariance matrix onto the filters and takes log-power.
    ///
    /// Output is `(n_samples, n_components)` with entries
    /// `ln(w_j^T C_i w_j)`.
    pub fn transform(&self, band: FrequencyBand, block: &Array3<f64>) -> Result<Array2<f64>> {
        let (n, c, _) = block.dim();
        if c != self.filters.nrows() {
            return Err(PipelineError::ShapeMismatch {
                what: "channels",
                got: c,
                expected: self.filters.nrows(),
            });
        }

        let k = self.n_components();
        let mut out = Array2::zeros((n, k));
        for (i, cov) in block.outer_iter().enumerate() {
            for j in 0..k {
                let filter = self.filters.column(j);
                let power = filter.dot(&cov.dot(&filter));
                if power <= 0.0 {
                    return Err(PipelineError::DegenerateComponent { band, component: j });
                }
                out[[i, j]] = power.ln();
            }
        }

        Ok(out)
    }
}

fn to_dmatrix(a: &ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_row_iterator(a.nrows(), a.ncols(), a.iter().copied())
}
