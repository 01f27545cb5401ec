//! Sandwich covariance matrices `(X'X)^-1 S (X'X)^-1` for OLS coefficients.

use nalgebra::{DMatrix, DVector};

use crate::error::{RegressionError, Result};
use crate::hac::newey_west_long_run_covariance;
use crate::linalg::{ensure_finite, invert_spd, population_variance, scores, symmetrize};
use crate::options::CovarianceMethod;

/// Builds the "meat" matrix `S` for `method` from regressors and residuals.
///
/// - `Classical`: `X'X · var(u)` with the population variance of `u`.
/// - `White`: `Z'Z` where `Z_t = X_t u_t`.
/// - `NeweyWest { lags }`: `T` times the Newey-West long-run covariance of `Z`.
pub fn meat(
    x: &DMatrix<f64>,
    residuals: &DVector<f64>,
    method: CovarianceMethod,
) -> Result<DMatrix<f64>> {
    check_shapes(x, residuals)?;
    meat_with_variance(x, residuals, method, population_variance(residuals))
}

/// Coefficient covariance `(X'X)^-1 S (X'X)^-1` under `method`.
pub fn sandwich_covariance(
    x: &DMatrix<f64>,
    residuals: &DVector<f64>,
    method: CovarianceMethod,
) -> Result<DMatrix<f64>> {
    check_shapes(x, residuals)?;
    let bread = invert_spd(x.tr_mul(x), "X'X")?;
    sandwich_from_bread(x, residuals, &bread, method, population_variance(residuals))
}

/// Square roots of the diagonal of a covariance matrix.
///
/// Diagonal entries that are negative only through rounding are treated as
/// zero; anything more negative is a [`RegressionError::NumericalError`].
pub fn standard_errors(covariance: &DMatrix<f64>) -> Result<DVector<f64>> {
    if !covariance.is_square() {
        return Err(RegressionError::dimension_mismatch(
            "covariance shape",
            covariance.nrows(),
            covariance.ncols(),
        ));
    }
    let diagonal = covariance.diagonal();
    let scale = diagonal.amax();
    let tolerance = f64::EPSILON * scale.max(f64::MIN_POSITIVE) * diagonal.len() as f64;

    let mut errors = DVector::zeros(diagonal.len());
    for (index, variance) in diagonal.iter().enumerate() {
        if !variance.is_finite() || *variance < -tolerance {
            return Err(RegressionError::NumericalError {
                context: "standard errors",
            });
        }
        errors[index] = variance.max(0.0).sqrt();
    }
    Ok(errors)
}

/// Sandwich covariance with a precomputed bread and residual variance.
pub(crate) fn sandwich_from_bread(
    x: &DMatrix<f64>,
    residuals: &DVector<f64>,
    bread: &DMatrix<f64>,
    method: CovarianceMethod,
    residual_variance: f64,
) -> Result<DMatrix<f64>> {
    check_shapes(x, residuals)?;
    if bread.nrows() != x.ncols() || bread.ncols() != x.ncols() {
        return Err(RegressionError::dimension_mismatch(
            "bread dimension",
            x.ncols(),
            bread.nrows(),
        ));
    }

    let meat = meat_with_variance(x, residuals, method, residual_variance)?;
    let covariance = symmetrize(&(bread * meat * bread));
    ensure_finite(&covariance, "sandwich covariance")?;
    Ok(covariance)
}

fn meat_with_variance(
    x: &DMatrix<f64>,
    residuals: &DVector<f64>,
    method: CovarianceMethod,
    residual_variance: f64,
) -> Result<DMatrix<f64>> {
    let meat = match method {
        CovarianceMethod::Classical => x.tr_mul(x) * residual_variance,
        CovarianceMethod::White => {
            let z = scores(x, residuals)?;
            z.tr_mul(&z)
        }
        CovarianceMethod::NeweyWest { lags } => {
            let z = scores(x, residuals)?;
            newey_west_long_run_covariance(&z, lags)? * x.nrows() as f64
        }
    };
    ensure_finite(&meat, "covariance meat")?;
    Ok(meat)
}

fn check_shapes(x: &DMatrix<f64>, residuals: &DVector<f64>) -> Result<()> {
    if residuals.len() != x.nrows() {
        return Err(RegressionError::dimension_mismatch(
            "residual length",
            x.nrows(),
            residuals.len(),
        ));
    }
    if x.nrows() == 0 {
        return Err(RegressionError::InsufficientObservations {
            required: x.ncols().max(1),
            found: 0,
        });
    }
    Ok(())
}
