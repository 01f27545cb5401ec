//! Ordinary least squares with classical, White, and Newey-West coefficient covariances.
//!
//! This crate estimates a linear regression `y = X b + u` by OLS and offers
//! three estimators of the coefficient covariance, all written in the
//! sandwich form `(X'X)^-1 S (X'X)^-1`:
//!
//! - classical (Gauss-Markov), `S = X'X · var(u)`,
//! - White's heteroskedasticity-robust estimator, `S = Z'Z` with `Z_t = X_t u_t`,
//! - Newey-West, `S = T ·` the Bartlett-weighted long-run covariance of `Z`.
//!
//! Linear restrictions `R b = q` can be tested with a chi-square Wald test.
//!
//! The building blocks live in their own modules:
//!
//! - regression inputs and validation (`data` module),
//! - estimator selection and fit options (`options` module),
//! - the OLS fit itself (`ols` module),
//! - the Newey-West long-run covariance (`hac` module),
//! - the sandwich covariance builder (`sandwich` module),
//! - Wald tests (`wald` module), and
//! - a pipeline wrapper producing coefficient tables (`estimation` module).
//!
//! # Quick start
//!
//! ```no_run
//! use hacols::data::RegressionDataBuilder;
//! use hacols::{CovarianceMethod, OlsOptions, Regression};
//! use nalgebra::{DMatrix, DVector};
//!
//! // Excess market return explained by SMB and HML.
//! let excess_market = DVector::from_vec(vec![0.012, -0.004, 0.021, 0.003, -0.015, 0.008]);
//! let factors = DMatrix::from_row_slice(6, 2, &[
//!     0.002, 0.011, -0.007, 0.004, 0.010, -0.002,
//!     0.001, 0.006, -0.012, -0.003, 0.004, 0.009,
//! ]);
//!
//! let data = RegressionDataBuilder::new(excess_market)
//!     .regressors(factors)
//!     .labels(["SMB", "HML"])
//!     .with_intercept()
//!     .build()
//!     .expect("validated regression data");
//! let regression = Regression::new(data);
//!
//! let methods = [
//!     CovarianceMethod::Classical,
//!     CovarianceMethod::White,
//!     CovarianceMethod::NeweyWest { lags: 2 },
//! ];
//! let summary = regression
//!     .summarize(&OlsOptions::default(), &methods)
//!     .expect("full-rank design");
//!
//! let fit = regression.fit(&OlsOptions::default()).expect("full-rank design");
//! let test = regression
//!     .exclusion_test(&fit, CovarianceMethod::Classical, &["SMB", "HML"])
//!     .expect("valid restriction");
//! println!("{:?} / Wald {:.2}", summary.coefficients, test.statistic);
//! ```

pub mod data;
pub mod error;
pub mod estimation;
pub mod hac;
pub mod linalg;
pub mod ols;
pub mod options;
pub mod sandwich;
pub mod simulate;
pub mod wald;

pub use error::{RegressionError, Result};
pub use estimation::{CovarianceColumn, Regression, RegressionSummary};
pub use hac::newey_west_long_run_covariance;
pub use ols::{fit_ols, OlsFit};
pub use options::{CovarianceMethod, OlsOptions, VarianceDivisor};
pub use sandwich::{sandwich_covariance, standard_errors};
pub use wald::{wald_statistic, LinearRestriction, WaldTest};
