use nalgebra::{DMatrix, DVector, SVD};
use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};

/// The benchmark's regularization grid: 100 logarithmically spaced values
/// from `1e-5` to `1e10`.
pub fn log_alpha_grid() -> Vec<f64> {
    logspace(-5.0, 10.0, 100)
}

fn logspace(lo_exp: f64, hi_exp: f64, n: usize) -> Vec<f64> {
    let step = (hi_exp - lo_exp) / (n - 1) as f64;
    (0..n)
        .map(|k| 10f64.powf(lo_exp + step * k as f64))
        .collect()
}

/// Ridge regression with the regularization strength chosen by efficient
/// leave-one-out cross-validation over a candidate grid.
///
/// The design is centered so the intercept is fitted but not penalized.
/// Leave-one-out residuals come from the hat-matrix diagonal computed via a
/// thin SVD of the centered design, so the whole grid is scored from a
/// single decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeCv {
    alphas: Vec<f64>,
}

impl Default for RidgeCv {
    fn default() -> Self {
        Self {
            alphas: log_alpha_grid(),
        }
    }
}

impl RidgeCv {
    /// Uses a caller-provided candidate grid instead of the default one.
    pub fn with_alphas(alphas: Vec<f64>) -> Self {
        Self { alphas }
    }

    /// Fits coefficients, intercept, and the best alpha on `(x, y)`.
    ///
    /// # Errors
    /// Fails on shape mismatches, fewer than two samples, an empty grid,
    /// or a non-converging decomposition.
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedRidge> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(PipelineError::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: n,
            });
        }
        if n < 2 {
            return Err(PipelineError::TooFewSamples { got: n, min: 2 });
        }
        if p == 0 {
            return Err(PipelineError::ShapeMismatch {
                what: "features",
                got: 0,
                expected: 1,
            });
        }
        if self.alphas.is_empty() {
            return Err(PipelineError::Numeric("empty alpha grid"));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or(PipelineError::TooFewSamples { got: n, min: 2 })?;
        let xc = x - &x_mean;
        let y_mean = y.sum() / n as f64;
        let yc = y.mapv(|v| v - y_mean);

        let design = DMatrix::from_row_iterator(n, p, xc.iter().copied());
        let svd = SVD::try_new(design, true, true, f64::EPSILON, 1000)
            .ok_or(PipelineError::Numeric("SVD of the design matrix"))?;
        let u = svd.u.ok_or(PipelineError::Numeric("SVD left vectors"))?;
        let v_t = svd.v_t.ok_or(PipelineError::Numeric("SVD right vectors"))?;
        let sigma = svd.singular_values;
        let r = sigma.len();

        let yc_vec = DVector::from_iterator(n, yc.iter().copied());
        let ut_y = u.transpose() * yc_vec;

        // Score every alpha with the closed-form leave-one-out residuals.
        let mut best_alpha = self.alphas[0];
        let mut best_press = f64::INFINITY;
        for &alpha in &self.alphas {
            let shrink: Vec<f64> = sigma
                .iter()
                .map(|&s| {
                    let s2 = s * s;
                    s2 / (s2 + alpha)
                })
                .collect();

            let mut press = 0.0;
            for i in 0..n {
                let mut fitted = 0.0;
                let mut leverage = 0.0;
                for j in 0..r {
                    let uij = u[(i, j)];
                    fitted += shrink[j] * uij * ut_y[j];
                    leverage += shrink[j] * uij * uij;
                }
                let denom = (1.0 - leverage).max(1e-12);
                let residual = (yc[i] - fitted) / denom;
                press += residual * residual;
            }
            press /= n as f64;

            if press < best_press {
                best_press = press;
                best_alpha = alpha;
            }
        }

        let mut coef = Array1::zeros(p);
        for j in 0..r {
            let s = sigma[j];
            if s > 0.0 {
                let weight = s / (s * s + best_alpha) * ut_y[j];
                for col in 0..p {
                    coef[col] += weight * v_t[(j, col)];
                }
            }
        }
        let intercept = y_mean - x_mean.dot(&coef);

        log::debug!(
            "ridge selected alpha {best_alpha:e} (leave-one-out mse {best_press:.6e}) \
             over {} candidate(s)",
            self.alphas.len()
        );

        Ok(FittedRidge {
            coef,
            intercept,
            alpha: best_alpha,
            loo_mse: best_press,
        })
    }
}

/// A fitted ridge model.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedRidge {
    coef: Array1<f64>,
    intercept: f64,
    alpha: f64,
    loo_mse: f64,
}

impl FittedRidge {
    /// Predicts targets for a feature matrix.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coef.len() {
            return Err(PipelineError::ShapeMismatch {
                what: "features",
                got: x.ncols(),
                expected: self.coef.len(),
            });
        }
        Ok(x.dot(&self.coef) + self.intercept)
    }

    /// Learned coefficients, one per input feature.
    pub fn coef(&self) -> &Array1<f64> {
        &self.coef
    }

    /// Unpenalized intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// The regularization strength selected by cross-validation.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Mean squared leave-one-out residual at the selected alpha.
    pub fn loo_mse(&self) -> f64 {
        self.loo_mse
    }
}
