//! Configuration structures for the OLS fit and the coefficient covariance estimators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};

/// Choice of "meat" matrix used by the sandwich covariance builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum CovarianceMethod {
    /// Gauss-Markov covariance, `S = X'X · var(u)`.
    Classical,
    /// White's heteroskedasticity-robust covariance, `S = Z'Z` with `Z_t = X_t u_t`.
    White,
    /// Newey-West covariance with a Bartlett kernel truncated after `lags` lags.
    NeweyWest {
        /// Number of autocovariance lags included in the long-run covariance.
        lags: usize,
    },
}

impl CovarianceMethod {
    /// Builds a Newey-West selector from a signed lag count, rejecting negative values.
    pub fn newey_west(lags: i64) -> Result<Self> {
        let lags = usize::try_from(lags).map_err(|_| RegressionError::InvalidLagCount { lags })?;
        Ok(Self::NeweyWest { lags })
    }

    /// Short label used in summaries and [`fmt::Display`].
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CovarianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classical => f.write_str("classical"),
            Self::White => f.write_str("white"),
            Self::NeweyWest { lags } => write!(f, "newey-west:{lags}"),
        }
    }
}

impl FromStr for CovarianceMethod {
    type Err = RegressionError;

    /// Parses `classical`, `white` or `newey-west:<lags>` (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "classical" | "iid" => Ok(Self::Classical),
            "white" | "hc0" => Ok(Self::White),
            other => {
                let lags = other
                    .strip_prefix("newey-west:")
                    .or_else(|| other.strip_prefix("nw:"))
                    .ok_or_else(|| {
                        RegressionError::InvalidParameter(format!(
                            "unknown covariance method `{s}`"
                        ))
                    })?;
                let lags: i64 = lags.trim().parse().map_err(|_| {
                    RegressionError::InvalidParameter(format!("lag count `{lags}` is not an integer"))
                })?;
                Self::newey_west(lags)
            }
        }
    }
}

/// Divisor applied to the residual sum of squares when estimating `σ²`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceDivisor {
    /// Population variance of the residuals, dividing by `T`.
    #[default]
    Observations,
    /// Degrees-of-freedom corrected variance, dividing by `T - k`.
    DegreesOfFreedom,
}

impl VarianceDivisor {
    /// Returns the divisor for a sample of `nobs` observations and `nparams` coefficients.
    pub fn divisor(&self, nobs: usize, nparams: usize) -> f64 {
        match self {
            Self::Observations => nobs as f64,
            Self::DegreesOfFreedom => nobs.saturating_sub(nparams) as f64,
        }
    }
}

/// Options for the OLS fit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OlsOptions {
    /// Convention used for the residual variance in the classical covariance.
    pub divisor: VarianceDivisor,
}

impl OlsOptions {
    /// Override the residual variance divisor while keeping other defaults.
    pub fn with_divisor(mut self, divisor: VarianceDivisor) -> Self {
        self.divisor = divisor;
        self
    }
}
