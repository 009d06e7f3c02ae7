use anyhow::Result;
use ndarray::{s, Array1, Array2, Array3};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regress_core::BandCovariances;
use solvers::{from_spec, Solver, SolverSpec};

/// Random SPD covariance matrices with one target-modulated channel.
fn spd_block(y: &Array1<f64>, c: usize, rng: &mut StdRng) -> Array3<f64> {
    let n = y.len();
    let mut block = Array3::zeros((n, c, c));
    for i in 0..n {
        let a: Array2<f64> = Array2::random_using((c, c), StandardNormal, rng);
        let mut cov = a.t().dot(&a) * 0.05;
        for j in 0..c {
            cov[[j, j]] += 1.0;
        }
        cov[[0, 0]] += (1.5 * y[i]).exp();
        block.slice_mut(s![i, .., ..]).assign(&cov);
    }
    block
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(7);
    let n = 120;
    let n_channels = 8;

    let y = Array1::from_shape_fn(n, |_| rng.random::<f64>() * 2.0 - 1.0);
    let x = BandCovariances::from_named_blocks([
        ("low", spd_block(&y, n_channels, &mut rng)),
        ("alpha", spd_block(&y, n_channels, &mut rng)),
    ])?;

    let specs = [
        SolverSpec::Diag {
            frequency_bands: "low-alpha".into(),
        },
        SolverSpec::Spoc {
            frequency_bands: "low".into(),
            rank: 0.4,
        },
    ];

    for spec in &specs {
        let mut solver = from_spec(spec)?;
        solver.configure(x.clone(), y.clone(), n_channels)?;
        solver.fit(1)?;

        let model = solver.result()?;
        let y_pred = model.predict(&x)?;
        let rmse = ((&y_pred - &y).mapv(|v| v * v).sum() / n as f64).sqrt();

        println!(
            "{}: {} feature(s), alpha {:e}, training rmse {:.4}",
            solver.name(),
            model.n_features(),
            model.ridge().alpha(),
            rmse
        );
    }

    Ok(())
}
