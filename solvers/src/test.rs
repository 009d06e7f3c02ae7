#![cfg(test)]

use ndarray::{Array1, Array3};
use regress_core::{BandCovariances, PipelineError};

use crate::{from_spec, AnySolver, DiagSolver, Solver, SolverError, SolverSpec, SpocSolver};

fn targets(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| (i as f64 / n as f64) * 2.0 - 1.0)
}

// Diagonal covariances whose channel log-powers are linear in y.
fn linear_block(y: &Array1<f64>, c: usize, gain: f64) -> Array3<f64> {
    let n = y.len();
    let mut block = Array3::zeros((n, c, c));
    for i in 0..n {
        for j in 0..c {
            block[[i, j, j]] = (gain * (j + 1) as f64 * y[i]).exp();
        }
    }
    block
}

fn two_band_data(n: usize, c: usize) -> (BandCovariances, Array1<f64>) {
    let y = targets(n);
    let x = BandCovariances::from_named_blocks([
        ("low", linear_block(&y, c, 0.8)),
        ("alpha", linear_block(&y, c, 0.3)),
    ])
    .unwrap();
    (x, y)
}

#[test]
fn diag_low_alpha_requires_both_bands() {
    let y = targets(10);
    let only_low =
        BandCovariances::from_named_blocks([("low", linear_block(&y, 3, 1.0))]).unwrap();

    let mut solver = DiagSolver::new("low-alpha").unwrap();
    let err = solver.configure(only_low, y.clone(), 3).unwrap_err();
    assert!(matches!(
        err,
        SolverError::InvalidConfig(PipelineError::MissingBand { .. })
    ));

    // With both bands present the same configuration is accepted.
    let (x, y) = two_band_data(10, 3);
    solver.configure(x, y, 3).unwrap();
}

#[test]
fn coefficients_match_concatenated_feature_width() {
    let (x, y) = two_band_data(20, 4);
    let mut solver = DiagSolver::new("low-alpha").unwrap();
    solver.configure(x, y, 4).unwrap();
    solver.fit(1).unwrap();

    // 4 channels per band, two bands.
    assert_eq!(solver.result().unwrap().n_features(), 8);
}

#[test]
fn diag_round_trip_reconstructs_targets() {
    let (x, y) = two_band_data(24, 3);
    let mut solver = DiagSolver::new("low-alpha").unwrap();
    solver.configure(x.clone(), y.clone(), 3).unwrap();
    solver.fit(1).unwrap();

    let y_pred = solver.result().unwrap().predict(&x).unwrap();
    let rmse = ((&y_pred - &y).mapv(|v| v * v).sum() / y.len() as f64).sqrt();
    assert!(rmse < 1e-2, "rmse {rmse}");
}

#[test]
fn spoc_derives_rank_from_fraction() {
    let solver = SpocSolver::new("low", 0.2).unwrap();
    assert_eq!(solver.derived_rank(10), 2);

    for (fraction, expected) in [(0.2, 2), (0.4, 4), (0.6, 6), (0.8, 8), (0.99, 9)] {
        let solver = SpocSolver::new("low", fraction).unwrap();
        assert_eq!(solver.derived_rank(10), expected);
    }
}

#[test]
fn spoc_zero_rank_fails_at_configure() {
    // floor(0.2 * 4) = 0, which is not a usable rank.
    let y = targets(8);
    let x = BandCovariances::from_named_blocks([("low", linear_block(&y, 4, 1.0))]).unwrap();

    let mut solver = SpocSolver::new("low", 0.2).unwrap();
    let err = solver.configure(x, y, 4).unwrap_err();
    assert_eq!(
        err,
        SolverError::InvalidConfig(PipelineError::InvalidRank {
            rank: 0,
            n_channels: 4
        })
    );
}

#[test]
fn spoc_rank_fraction_must_be_in_unit_interval() {
    for bad in [0.0, -0.5, 1.5] {
        let err = SpocSolver::new("low", bad).unwrap_err();
        assert_eq!(err, SolverError::RankFractionOutOfRange { got: bad });
    }
}

#[test]
fn spoc_fits_with_derived_rank() {
    let n = 30;
    let c = 10;
    let y = targets(n);

    // Identity background with one target-modulated channel.
    let mut block = Array3::zeros((n, c, c));
    for i in 0..n {
        for j in 0..c {
            block[[i, j, j]] = 1.0;
        }
        block[[i, 0, 0]] += (1.2 * y[i]).exp();
    }
    let x = BandCovariances::from_named_blocks([("low", block)]).unwrap();

    let mut solver = SpocSolver::new("low", 0.2).unwrap();
    solver.configure(x.clone(), y.clone(), c).unwrap();
    solver.fit(1).unwrap();

    // Rank 2 projection; the variance threshold may drop degenerate
    // components but never adds any.
    let model = solver.result().unwrap();
    assert!(model.n_features() >= 1 && model.n_features() <= 2);

    let y_pred = model.predict(&x).unwrap();
    let rmse = ((&y_pred - &y).mapv(|v| v * v).sum() / n as f64).sqrt();
    assert!(rmse < 0.3, "rmse {rmse}");
}

#[test]
fn solvers_are_single_shot() {
    use crate::StoppingCriterion;

    let diag = DiagSolver::new("low").unwrap();
    let spoc = SpocSolver::new("low", 0.4).unwrap();
    assert_eq!(diag.stopping_criterion(), StoppingCriterion::SingleRun);
    assert_eq!(spoc.stopping_criterion(), StoppingCriterion::SingleRun);
}

#[test]
fn configure_is_idempotent() {
    let (x, y) = two_band_data(16, 3);

    let mut once = DiagSolver::new("low-alpha").unwrap();
    once.configure(x.clone(), y.clone(), 3).unwrap();
    once.fit(1).unwrap();

    let mut twice = DiagSolver::new("low-alpha").unwrap();
    twice.configure(x.clone(), y.clone(), 3).unwrap();
    twice.configure(x, y, 3).unwrap();
    twice.fit(1).unwrap();

    assert_eq!(
        once.result().unwrap().ridge().coef(),
        twice.result().unwrap().ridge().coef()
    );
}

#[test]
fn n_iter_is_ignored() {
    let (x, y) = two_band_data(16, 3);

    let mut a = DiagSolver::new("low-alpha").unwrap();
    a.configure(x.clone(), y.clone(), 3).unwrap();
    a.fit(0).unwrap();

    let mut b = DiagSolver::new("low-alpha").unwrap();
    b.configure(x, y, 3).unwrap();
    b.fit(1000).unwrap();

    assert_eq!(
        a.result().unwrap().ridge().coef(),
        b.result().unwrap().ridge().coef()
    );
}

#[test]
fn strict_call_sequence_is_enforced() {
    let mut solver = DiagSolver::new("low").unwrap();
    assert_eq!(solver.fit(1).unwrap_err(), SolverError::NotConfigured);
    assert_eq!(solver.result().unwrap_err(), SolverError::NotFitted);

    let y = targets(8);
    let x = BandCovariances::from_named_blocks([("low", linear_block(&y, 2, 1.0))]).unwrap();
    solver.configure(x, y, 2).unwrap();
    // Still unfitted after reconfiguration.
    assert_eq!(solver.result().unwrap_err(), SolverError::NotFitted);
}

#[test]
fn reconfigure_clears_a_stale_model() {
    let (x, y) = two_band_data(12, 3);
    let mut solver = DiagSolver::new("low-alpha").unwrap();
    solver.configure(x.clone(), y.clone(), 3).unwrap();
    solver.fit(1).unwrap();
    assert!(solver.result().is_ok());

    solver.configure(x, y, 3).unwrap();
    assert_eq!(solver.result().unwrap_err(), SolverError::NotFitted);
}

#[test]
fn channel_count_mismatch_is_a_configure_error() {
    let (x, y) = two_band_data(8, 3);
    let mut solver = DiagSolver::new("low-alpha").unwrap();
    let err = solver.configure(x, y, 5).unwrap_err();
    assert!(matches!(
        err,
        SolverError::InvalidConfig(PipelineError::ShapeMismatch { what: "channels", .. })
    ));
}

#[test]
fn from_spec_builds_named_solvers() {
    let diag = from_spec(&SolverSpec::Diag {
        frequency_bands: "low".into(),
    })
    .unwrap();
    assert_eq!(diag.name(), "diag");

    let spoc = from_spec(&SolverSpec::Spoc {
        frequency_bands: "low".into(),
        rank: 0.4,
    })
    .unwrap();
    assert_eq!(spoc.name(), "SPoC");

    assert!(matches!(diag, AnySolver::Diag(_)));
    assert!(matches!(spoc, AnySolver::Spoc(_)));

    let err = from_spec(&SolverSpec::Diag {
        frequency_bands: "gamma".into(),
    })
    .unwrap_err();
    assert!(matches!(err, SolverError::InvalidConfig(_)));
}

#[test]
fn benchmark_grids_are_valid() {
    for bands in DiagSolver::FREQUENCY_BAND_GRID {
        DiagSolver::new(bands).unwrap();
    }
    for fraction in SpocSolver::RANK_FRACTION_GRID {
        for bands in SpocSolver::FREQUENCY_BAND_GRID {
            SpocSolver::new(bands, fraction).unwrap();
        }
    }
}
