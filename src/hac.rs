//! Newey-West long-run covariance with a Bartlett kernel.
//!
//! For a `T × q` matrix of per-period vectors `g` the estimator is
//!
//! ```text
//! S   = Γ₀ + Σ_{s=1}^{m} w_s (Γ_s + Γ_sᵀ),      w_s = 1 - s / (m + 1)
//! Γ_s = (1/T) Σ_{t=s+1}^{T} ĝ_t ĝ_{t-s}ᵀ,      ĝ_t = g_t - mean(g)
//! ```
//!
//! Every autocovariance is divided by `T`, not `T - s`; together with the
//! Bartlett weights this keeps `S` positive semi-definite. `S` estimates
//! `Cov(√T · mean(g))`. Callers that want the covariance of the sum or of the
//! mean rescale by `T` or `1/T` themselves.
//!
//! # References
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use log::trace;
use nalgebra::DMatrix;

use crate::error::{RegressionError, Result};
use crate::linalg::{demean_columns, ensure_finite, symmetrize};

/// Bartlett (tent) kernel weight for `lag` under truncation `max_lag`.
///
/// Equals `1` at lag zero, decays linearly to `1 / (max_lag + 1)` at `max_lag`,
/// and is `0` beyond it.
pub fn bartlett_weight(lag: usize, max_lag: usize) -> f64 {
    if lag == 0 {
        1.0
    } else if lag <= max_lag {
        1.0 - lag as f64 / (max_lag as f64 + 1.0)
    } else {
        0.0
    }
}

/// Lag-`lag` autocovariance `Γ_s` of an already demeaned `T × q` matrix.
///
/// Returns a `q × q` matrix whose `(i, j)` entry is
/// `Σ_t centered[t, i] · centered[t - lag, j] / T`. Lags at or beyond `T`
/// yield zeros.
pub fn autocovariance(centered: &DMatrix<f64>, lag: usize) -> DMatrix<f64> {
    let (nobs, dim) = centered.shape();
    if nobs == 0 || lag >= nobs {
        return DMatrix::zeros(dim, dim);
    }
    let span = nobs - lag;
    let leading = centered.rows(lag, span);
    let lagged = centered.rows(0, span);
    leading.tr_mul(&lagged) / nobs as f64
}

/// Newey-West estimate of the long-run covariance of the rows of `g`.
///
/// `lags` is clamped to `T - 1`. With `lags == 0` the result is `Γ₀`.
pub fn newey_west_long_run_covariance(g: &DMatrix<f64>, lags: usize) -> Result<DMatrix<f64>> {
    let nobs = g.nrows();
    if nobs == 0 {
        return Err(RegressionError::InsufficientObservations {
            required: 1,
            found: 0,
        });
    }
    ensure_finite(g, "Newey-West input")?;

    let max_lag = lags.min(nobs - 1);
    let centered = demean_columns(g);

    let mut long_run = autocovariance(&centered, 0);
    for lag in 1..=max_lag {
        let weight = bartlett_weight(lag, max_lag);
        trace!("Newey-West lag {lag}/{max_lag}: weight {weight:.6}");
        let gamma = autocovariance(&centered, lag);
        long_run += (&gamma + gamma.transpose()) * weight;
    }

    let long_run = symmetrize(&long_run);
    ensure_finite(&long_run, "Newey-West long-run covariance")?;
    Ok(long_run)
}
