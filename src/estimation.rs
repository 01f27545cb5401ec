//! High-level regression pipeline: fit, covariance estimators, and joint tests.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::data::RegressionData;
use crate::error::{RegressionError, Result};
use crate::ols::{fit_ols, OlsFit};
use crate::options::{CovarianceMethod, OlsOptions};
use crate::sandwich::standard_errors;
use crate::wald::{LinearRestriction, WaldTest};

/// Wrapper that owns validated regression data and runs the estimators on it.
#[derive(Clone, Debug)]
pub struct Regression {
    data: RegressionData,
}

impl Regression {
    /// Constructs a new regression problem.
    pub fn new(data: RegressionData) -> Self {
        Self { data }
    }

    /// Accessor for the regression data.
    pub fn data(&self) -> &RegressionData {
        &self.data
    }

    /// Fits the model by OLS.
    pub fn fit(&self, options: &OlsOptions) -> Result<OlsFit> {
        fit_ols(self.data.y(), self.data.x(), options)
    }

    /// Coefficient covariance of `fit` under `method`.
    pub fn covariance(&self, fit: &OlsFit, method: CovarianceMethod) -> Result<DMatrix<f64>> {
        fit.covariance(self.data.x(), method)
    }

    /// Wald test of `restriction` using the covariance selected by `method`.
    pub fn wald_test(
        &self,
        fit: &OlsFit,
        method: CovarianceMethod,
        restriction: &LinearRestriction,
    ) -> Result<WaldTest> {
        let covariance = self.covariance(fit, method)?;
        WaldTest::compute(&fit.coefficients, &covariance, restriction)
    }

    /// Joint test that the named coefficients are all zero.
    pub fn exclusion_test(
        &self,
        fit: &OlsFit,
        method: CovarianceMethod,
        labels: &[&str],
    ) -> Result<WaldTest> {
        let indices = labels
            .iter()
            .map(|label| {
                self.data
                    .labels()
                    .iter()
                    .position(|candidate| candidate == label)
                    .ok_or_else(|| {
                        RegressionError::invalid_restriction(format!(
                            "unknown coefficient `{label}`"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let restriction = LinearRestriction::exclusion(self.data.nparams(), &indices)?;
        self.wald_test(fit, method, &restriction)
    }

    /// Fits the model and reports standard errors under each of `methods`.
    pub fn summarize(
        &self,
        options: &OlsOptions,
        methods: &[CovarianceMethod],
    ) -> Result<RegressionSummary> {
        let fit = self.fit(options)?;
        let columns = methods
            .iter()
            .map(|&method| {
                let covariance = self.covariance(&fit, method)?;
                let standard_errors = standard_errors(&covariance)?;
                let t_statistics = fit.t_statistics(&standard_errors)?;
                Ok(CovarianceColumn {
                    method,
                    standard_errors,
                    t_statistics,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RegressionSummary {
            labels: self.data.labels().to_vec(),
            nobs: fit.nobs(),
            coefficients: fit.coefficients.clone(),
            r_squared: fit.r_squared,
            adj_r_squared: fit.adj_r_squared,
            columns,
        })
    }
}

/// Standard errors and t-statistics for one covariance estimator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CovarianceColumn {
    /// The estimator the column was computed with.
    pub method: CovarianceMethod,
    /// Square roots of the covariance diagonal.
    pub standard_errors: DVector<f64>,
    /// Coefficients divided by `standard_errors`.
    pub t_statistics: DVector<f64>,
}

/// Numeric contents of a coefficient table; rendering is left to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// Coefficient labels, in column order of `X`.
    pub labels: Vec<String>,
    /// Number of observations.
    pub nobs: usize,
    /// OLS coefficient estimates.
    pub coefficients: DVector<f64>,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Adjusted `R²`, if defined.
    pub adj_r_squared: Option<f64>,
    /// One entry per requested covariance estimator.
    pub columns: Vec<CovarianceColumn>,
}

impl RegressionSummary {
    /// Standard errors reported for `method`, if it was requested.
    pub fn standard_errors(&self, method: CovarianceMethod) -> Option<&DVector<f64>> {
        self.columns
            .iter()
            .find(|column| column.method == method)
            .map(|column| &column.standard_errors)
    }
}
