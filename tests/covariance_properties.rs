use approx::assert_relative_eq;
use hacols::data::RegressionData;
use hacols::linalg::{demean_columns, population_variance};
use hacols::simulate::{simulate_regression, SimulationConfig};
use hacols::{
    fit_ols, newey_west_long_run_covariance, sandwich_covariance, standard_errors, wald_statistic,
    CovarianceMethod, LinearRestriction, OlsOptions, Regression, RegressionError, WaldTest,
};
use nalgebra::{DMatrix, DVector};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

fn gaussian_matrix(rows: usize, cols: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    DMatrix::from_fn(rows, cols, |_, _| StandardNormal.sample(&mut rng))
}

fn factor_sample(seed: u64) -> RegressionData {
    let config = SimulationConfig::default()
        .with_nobs(388)
        .with_coefficients(vec![0.006, 0.25, 0.35]);
    simulate_regression(&config, seed).unwrap()
}

#[test]
fn residuals_are_orthogonal_to_regressors() {
    let data = factor_sample(1);
    let fit = fit_ols(data.y(), data.x(), &OlsOptions::default()).unwrap();
    let xtu = data.x().tr_mul(&fit.residuals);
    let scale = data.x().norm() * data.y().norm();
    assert!(xtu.amax() <= 1e-8 * scale, "X'u = {xtu}");
}

#[test]
fn classical_sandwich_equals_direct_formula() {
    let data = factor_sample(2);
    let fit = fit_ols(data.y(), data.x(), &OlsOptions::default()).unwrap();
    let sandwich = sandwich_covariance(data.x(), &fit.residuals, CovarianceMethod::Classical)
        .unwrap();
    let direct = &fit.xtx_inverse * population_variance(&fit.residuals);
    assert_relative_eq!(sandwich, direct, max_relative = 1e-9);
    assert_relative_eq!(sandwich, fit.classical_covariance, max_relative = 1e-9);
}

#[test]
fn newey_west_without_lags_is_white_on_moments() {
    let g = gaussian_matrix(120, 3, 3);
    let centered = demean_columns(&g);
    let expected = centered.tr_mul(&centered) / 120.0;
    let s = newey_west_long_run_covariance(&g, 0).unwrap();
    assert_relative_eq!(s, expected, epsilon = 1e-12);
}

#[test]
fn newey_west_is_symmetric_for_every_lag() {
    let g = gaussian_matrix(60, 4, 4);
    for lags in 0..=8 {
        let s = newey_west_long_run_covariance(&g, lags).unwrap();
        assert_eq!(s, s.transpose(), "asymmetric at lag {lags}");
    }
}

#[test]
fn newey_west_clamps_oversized_lag_counts() {
    let g = gaussian_matrix(9, 2, 5);
    let at_limit = newey_west_long_run_covariance(&g, 8).unwrap();
    for lags in [9, 10, 50] {
        assert_eq!(newey_west_long_run_covariance(&g, lags).unwrap(), at_limit);
    }
}

#[test]
fn scalar_newey_west_matches_weighted_autocovariances() {
    let g = gaussian_matrix(40, 1, 6);
    let lags = 3;
    let n = g.nrows();
    let mean = g.mean();
    let centered: Vec<f64> = g.iter().map(|value| value - mean).collect();
    let gamma = |s: usize| -> f64 {
        (s..n).map(|t| centered[t] * centered[t - s]).sum::<f64>() / n as f64
    };
    let mut expected = gamma(0);
    for s in 1..=lags {
        expected += 2.0 * (1.0 - s as f64 / (lags as f64 + 1.0)) * gamma(s);
    }

    let s = newey_west_long_run_covariance(&g, lags).unwrap();
    assert_eq!(s.shape(), (1, 1));
    assert_relative_eq!(s[(0, 0)], expected, epsilon = 1e-12);
}

#[test]
fn wald_statistic_is_invariant_to_reparametrisation() {
    let data = factor_sample(7);
    let fit = fit_ols(data.y(), data.x(), &OlsOptions::default()).unwrap();
    let v = sandwich_covariance(data.x(), &fit.residuals, CovarianceMethod::White).unwrap();

    let r = DMatrix::from_row_slice(2, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    let q = DVector::from_vec(vec![0.2, 0.3]);
    let base = wald_statistic(
        &fit.coefficients,
        &v,
        &LinearRestriction::new(r.clone(), q.clone()).unwrap(),
    )
    .unwrap();

    let transform = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, -3.0]);
    let mixed = LinearRestriction::new(&transform * &r, &transform * &q).unwrap();
    let scaled = LinearRestriction::new(&r * 10.0, &q * 10.0).unwrap();

    assert_relative_eq!(
        wald_statistic(&fit.coefficients, &v, &mixed).unwrap(),
        base,
        max_relative = 1e-8
    );
    assert_relative_eq!(
        wald_statistic(&fit.coefficients, &v, &scaled).unwrap(),
        base,
        max_relative = 1e-8
    );
}

#[test]
fn white_errors_exceed_classical_under_heteroskedasticity() {
    let config = SimulationConfig::default()
        .with_nobs(2_000)
        .with_heteroskedasticity(3.0);
    let data = simulate_regression(&config, 8).unwrap();
    let fit = fit_ols(data.y(), data.x(), &OlsOptions::default()).unwrap();

    let classical = fit.standard_errors().unwrap();
    let white = standard_errors(&fit.covariance(data.x(), CovarianceMethod::White).unwrap())
        .unwrap();
    assert!(white[1] > 1.2 * classical[1], "white {white} classical {classical}");
}

#[test]
fn newey_west_errors_exceed_white_under_autocorrelation() {
    let config = SimulationConfig::default().with_nobs(2_000).with_rho(0.6);
    let data = simulate_regression(&config, 9).unwrap();
    let fit = fit_ols(data.y(), data.x(), &OlsOptions::default()).unwrap();

    let white = standard_errors(&fit.covariance(data.x(), CovarianceMethod::White).unwrap())
        .unwrap();
    let newey_west = standard_errors(
        &fit.covariance(data.x(), CovarianceMethod::NeweyWest { lags: 5 })
            .unwrap(),
    )
    .unwrap();
    // Only the intercept's score inherits the error autocorrelation.
    assert!(newey_west[0] > 1.2 * white[0]);
}

#[test]
fn three_factor_pipeline_rejects_joint_exclusion() {
    let regression = Regression::new(factor_sample(10));
    let options = OlsOptions::default();
    let methods = [
        CovarianceMethod::Classical,
        CovarianceMethod::White,
        CovarianceMethod::NeweyWest { lags: 2 },
    ];
    let summary = regression.summarize(&options, &methods).unwrap();
    assert_eq!(summary.nobs, 388);
    assert_eq!(summary.labels, vec!["const", "f1", "f2"]);
    for column in &summary.columns {
        assert_eq!(column.standard_errors.len(), 3);
        assert!(column.standard_errors.iter().all(|se| *se > 0.0));
    }

    let fit = regression.fit(&options).unwrap();
    let test = regression
        .exclusion_test(&fit, CovarianceMethod::Classical, &["f1", "f2"])
        .unwrap();
    assert_eq!(test.degrees_of_freedom, 2);
    assert_relative_eq!(test.critical_value(0.10).unwrap(), 4.605, epsilon = 1e-3);
    assert!(test.rejects(0.10).unwrap());
    assert!(test.p_value().unwrap() < 1e-6);
}

#[test]
fn regressor_units_do_not_change_inference() {
    let data = factor_sample(11);
    let mut rescaled = data.x().clone();
    rescaled.column_mut(1).scale_mut(1e8);

    let fit = fit_ols(data.y(), data.x(), &OlsOptions::default()).unwrap();
    let scaled_fit = fit_ols(data.y(), &rescaled, &OlsOptions::default()).unwrap();
    assert_relative_eq!(
        scaled_fit.coefficients[1] * 1e8,
        fit.coefficients[1],
        max_relative = 1e-6
    );

    let method = CovarianceMethod::NeweyWest { lags: 2 };
    let v = fit.covariance(data.x(), method).unwrap();
    let scaled_v = scaled_fit.covariance(&rescaled, method).unwrap();
    let se = standard_errors(&v).unwrap();
    let scaled_se = standard_errors(&scaled_v).unwrap();
    assert_relative_eq!(scaled_se[1] * 1e8, se[1], max_relative = 1e-6);
    assert_relative_eq!(scaled_se[2], se[2], max_relative = 1e-6);

    let restriction = LinearRestriction::exclusion(3, &[1, 2]).unwrap();
    let stat = wald_statistic(&fit.coefficients, &v, &restriction).unwrap();
    let scaled_stat = wald_statistic(&scaled_fit.coefficients, &scaled_v, &restriction).unwrap();
    assert_relative_eq!(scaled_stat, stat, max_relative = 1e-6);
}

#[test]
fn errors_surface_at_the_offending_entry_point() {
    let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
    let short = DVector::from_vec(vec![1.0, 2.0]);
    assert!(matches!(
        fit_ols(&short, &x, &OlsOptions::default()),
        Err(RegressionError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        sandwich_covariance(&x, &short, CovarianceMethod::White),
        Err(RegressionError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        "newey-west:-2".parse::<CovarianceMethod>(),
        Err(RegressionError::InvalidLagCount { lags: -2 })
    ));

    let collinear = DMatrix::from_row_slice(3, 2, &[1.0, 3.0, 1.0, 3.0, 1.0, 3.0]);
    let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
    assert!(matches!(
        fit_ols(&y, &collinear, &OlsOptions::default()),
        Err(RegressionError::SingularMatrix { .. })
    ));
}

#[test]
fn outputs_serialize_for_external_renderers() {
    let method = CovarianceMethod::NeweyWest { lags: 2 };
    let json = serde_json::to_value(method).unwrap();
    assert_eq!(json, serde_json::json!({ "method": "newey-west", "lags": 2 }));
    let classical = serde_json::to_value(CovarianceMethod::Classical).unwrap();
    assert_eq!(classical, serde_json::json!({ "method": "classical" }));

    let test = WaldTest {
        statistic: 60.01,
        degrees_of_freedom: 2,
    };
    let parsed: WaldTest = serde_json::from_str(&serde_json::to_string(&test).unwrap()).unwrap();
    assert_eq!(parsed, test);
}
