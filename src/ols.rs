//! Ordinary least squares point estimates and the classical coefficient covariance.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::linalg::{ensure_finite, ensure_finite_vector, invert_spd, population_variance};
use crate::options::{CovarianceMethod, OlsOptions, VarianceDivisor};
use crate::sandwich::{sandwich_from_bread, standard_errors};

/// Outcome of an OLS fit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OlsFit {
    /// Coefficient estimates `b = (X'X)^-1 X'Y`.
    pub coefficients: DVector<f64>,
    /// Residuals `u = Y - Xb`.
    pub residuals: DVector<f64>,
    /// Fitted values `Xb`.
    pub fitted: DVector<f64>,
    /// The "bread" `(X'X)^-1`, reused by every sandwich covariance.
    pub xtx_inverse: DMatrix<f64>,
    /// Residual variance `σ²` under the configured divisor.
    pub residual_variance: f64,
    /// Classical covariance `(X'X)^-1 σ²`.
    pub classical_covariance: DMatrix<f64>,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Adjusted `R²`; `None` when `T == k`.
    pub adj_r_squared: Option<f64>,
    /// Convention used for `residual_variance`.
    pub divisor: VarianceDivisor,
}

impl OlsFit {
    /// Number of observations.
    pub fn nobs(&self) -> usize {
        self.residuals.len()
    }

    /// Number of estimated coefficients.
    pub fn nparams(&self) -> usize {
        self.coefficients.len()
    }

    /// Classical standard errors, the square roots of the diagonal of
    /// [`classical_covariance`](Self::classical_covariance).
    pub fn standard_errors(&self) -> Result<DVector<f64>> {
        standard_errors(&self.classical_covariance)
    }

    /// Coefficient covariance under `method`, reusing the stored bread.
    ///
    /// `x` must be the regressor matrix the fit was computed from. For
    /// [`CovarianceMethod::Classical`] the stored residual variance is used,
    /// so the result equals [`classical_covariance`](Self::classical_covariance).
    pub fn covariance(&self, x: &DMatrix<f64>, method: CovarianceMethod) -> Result<DMatrix<f64>> {
        if x.nrows() != self.nobs() {
            return Err(RegressionError::dimension_mismatch(
                "regressor rows",
                self.nobs(),
                x.nrows(),
            ));
        }
        if x.ncols() != self.nparams() {
            return Err(RegressionError::dimension_mismatch(
                "regressor columns",
                self.nparams(),
                x.ncols(),
            ));
        }
        sandwich_from_bread(
            x,
            &self.residuals,
            &self.xtx_inverse,
            method,
            self.residual_variance,
        )
    }

    /// Ratios of coefficients to the supplied standard errors.
    pub fn t_statistics(&self, standard_errors: &DVector<f64>) -> Result<DVector<f64>> {
        if standard_errors.len() != self.nparams() {
            return Err(RegressionError::dimension_mismatch(
                "standard error length",
                self.nparams(),
                standard_errors.len(),
            ));
        }
        let t = self.coefficients.component_div(standard_errors);
        ensure_finite_vector(&t, "t-statistics")?;
        Ok(t)
    }
}

/// Fits `y = X b + u` by ordinary least squares.
///
/// `x` must already contain an intercept column if one is wanted.
pub fn fit_ols(y: &DVector<f64>, x: &DMatrix<f64>, options: &OlsOptions) -> Result<OlsFit> {
    let nobs = y.len();
    if x.nrows() != nobs {
        return Err(RegressionError::dimension_mismatch(
            "regressor rows",
            nobs,
            x.nrows(),
        ));
    }
    let nparams = x.ncols();
    if nparams == 0 || nobs < nparams {
        return Err(RegressionError::InsufficientObservations {
            required: nparams.max(1),
            found: nobs,
        });
    }
    ensure_finite_vector(y, "response validation")?;
    ensure_finite(x, "regressor validation")?;

    let xtx = x.tr_mul(x);
    let xtx_inverse = invert_spd(xtx, "X'X")?;
    let coefficients = &xtx_inverse * x.tr_mul(y);
    let fitted = x * &coefficients;
    let residuals = y - &fitted;

    let divisor = options.divisor.divisor(nobs, nparams);
    if divisor <= 0.0 {
        return Err(RegressionError::InsufficientObservations {
            required: nparams + 1,
            found: nobs,
        });
    }
    let rss = residuals.norm_squared();
    let residual_variance = match options.divisor {
        VarianceDivisor::Observations => population_variance(&residuals),
        VarianceDivisor::DegreesOfFreedom => rss / divisor,
    };
    let classical_covariance = &xtx_inverse * residual_variance;

    let y_mean = y.mean();
    let tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    // A constant response is reproduced exactly by any model with an intercept.
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 1.0 };
    let adj_r_squared = (nobs > nparams)
        .then(|| 1.0 - (1.0 - r_squared) * (nobs as f64 - 1.0) / (nobs - nparams) as f64);

    ensure_finite_vector(&coefficients, "coefficient estimation")?;
    ensure_finite(&classical_covariance, "classical covariance")?;

    debug!(
        "OLS fit: T = {nobs}, k = {nparams}, R² = {r_squared:.4}, σ² = {residual_variance:.6e}"
    );

    Ok(OlsFit {
        coefficients,
        residuals,
        fitted,
        xtx_inverse,
        residual_variance,
        classical_covariance,
        r_squared,
        adj_r_squared,
        divisor: options.divisor,
    })
}
