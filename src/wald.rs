//! Wald tests of linear restrictions `R b = q` on regression coefficients.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{RegressionError, Result};
use crate::linalg::{
    ensure_finite, ensure_finite_vector, invert_symmetric, reciprocal_condition, symmetrize,
    SINGULAR_RCOND,
};

/// A set of `J` linear restrictions `R b = q` on `k` coefficients.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearRestriction {
    r: DMatrix<f64>,
    q: DVector<f64>,
}

impl LinearRestriction {
    /// Validates and stores the restriction `R b = q`.
    ///
    /// `R` must have between one and `k` rows and full row rank.
    pub fn new(r: DMatrix<f64>, q: DVector<f64>) -> Result<Self> {
        let (rows, cols) = r.shape();
        if rows == 0 {
            return Err(RegressionError::invalid_restriction(
                "at least one restriction is required",
            ));
        }
        if rows > cols {
            return Err(RegressionError::invalid_restriction(format!(
                "{rows} restrictions on {cols} coefficients"
            )));
        }
        if q.len() != rows {
            return Err(RegressionError::dimension_mismatch(
                "restriction values",
                rows,
                q.len(),
            ));
        }
        ensure_finite(&r, "restriction matrix")?;
        ensure_finite_vector(&q, "restriction values")?;
        if !has_full_row_rank(&r) {
            return Err(RegressionError::invalid_restriction(
                "restriction matrix does not have full row rank",
            ));
        }
        Ok(Self { r, q })
    }

    /// Joint null `b_i = 0` for every index in `indices`, out of `nparams` coefficients.
    pub fn exclusion(nparams: usize, indices: &[usize]) -> Result<Self> {
        let mut r = DMatrix::zeros(indices.len(), nparams);
        for (row, &index) in indices.iter().enumerate() {
            if index >= nparams {
                return Err(RegressionError::invalid_restriction(format!(
                    "coefficient index {index} out of range for {nparams} coefficients"
                )));
            }
            r[(row, index)] = 1.0;
        }
        Self::new(r, DVector::zeros(indices.len()))
    }

    /// The restriction matrix `R` (`J × k`).
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.r
    }

    /// The hypothesised values `q` (length `J`).
    pub fn values(&self) -> &DVector<f64> {
        &self.q
    }

    /// Number of restrictions `J`, the degrees of freedom of the test.
    pub fn restriction_count(&self) -> usize {
        self.r.nrows()
    }

    /// Number of coefficients `k` the restriction applies to.
    pub fn nparams(&self) -> usize {
        self.r.ncols()
    }
}

/// Rank is judged after scaling every row to unit length, so restrictions
/// written in very different units are not mistaken for dependent ones.
fn has_full_row_rank(r: &DMatrix<f64>) -> bool {
    let norms: Vec<f64> = r.row_iter().map(|row| row.norm()).collect();
    if norms.iter().any(|norm| *norm == 0.0) {
        return false;
    }
    let normalized = DMatrix::from_fn(r.nrows(), r.ncols(), |row, col| r[(row, col)] / norms[row]);
    reciprocal_condition(&normalized) >= SINGULAR_RCOND
}

/// Wald statistic `(Rb - q)' (R V R')^-1 (Rb - q)`.
pub fn wald_statistic(
    coefficients: &DVector<f64>,
    covariance: &DMatrix<f64>,
    restriction: &LinearRestriction,
) -> Result<f64> {
    let nparams = restriction.nparams();
    if coefficients.len() != nparams {
        return Err(RegressionError::dimension_mismatch(
            "coefficient length",
            nparams,
            coefficients.len(),
        ));
    }
    if covariance.nrows() != nparams || covariance.ncols() != nparams {
        return Err(RegressionError::dimension_mismatch(
            "covariance dimension",
            nparams,
            covariance.nrows().max(covariance.ncols()),
        ));
    }

    let r = restriction.matrix();
    let discrepancy = r * coefficients - restriction.values();
    let lambda = symmetrize(&(r * covariance * r.transpose()));
    let lambda_inverse = invert_symmetric(lambda, "R V R'")?;
    let statistic = discrepancy.dot(&(lambda_inverse * &discrepancy));
    if !statistic.is_finite() {
        return Err(RegressionError::NumericalError {
            context: "Wald statistic",
        });
    }
    Ok(statistic)
}

/// A Wald statistic together with its chi-square reference distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaldTest {
    /// The test statistic.
    pub statistic: f64,
    /// Number of restrictions `J`.
    pub degrees_of_freedom: usize,
}

impl WaldTest {
    /// Computes the statistic for `restriction` given estimates and their covariance.
    pub fn compute(
        coefficients: &DVector<f64>,
        covariance: &DMatrix<f64>,
        restriction: &LinearRestriction,
    ) -> Result<Self> {
        let statistic = wald_statistic(coefficients, covariance, restriction)?;
        let degrees_of_freedom = restriction.restriction_count();
        debug!("Wald test: statistic {statistic:.4} with {degrees_of_freedom} degrees of freedom");
        Ok(Self {
            statistic,
            degrees_of_freedom,
        })
    }

    /// Asymptotic p-value `P(χ²(J) > statistic)`.
    pub fn p_value(&self) -> Result<f64> {
        Ok(self.distribution()?.sf(self.statistic))
    }

    /// Upper `alpha` critical value of `χ²(J)`.
    pub fn critical_value(&self, alpha: f64) -> Result<f64> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(RegressionError::InvalidParameter(format!(
                "significance level must lie in (0, 1), found {alpha}"
            )));
        }
        Ok(self.distribution()?.inverse_cdf(1.0 - alpha))
    }

    /// Whether the null is rejected at significance level `alpha`.
    pub fn rejects(&self, alpha: f64) -> Result<bool> {
        Ok(self.statistic > self.critical_value(alpha)?)
    }

    fn distribution(&self) -> Result<ChiSquared> {
        ChiSquared::new(self.degrees_of_freedom as f64)
            .map_err(|err| RegressionError::InvalidParameter(err.to_string()))
    }
}
