//! Regression data containers and validation utilities used by the estimators.

use nalgebra::{DMatrix, DVector};

use crate::error::{RegressionError, Result};
use crate::linalg::{ensure_finite, ensure_finite_vector};

/// Label assigned to the column of ones added by [`RegressionDataBuilder::with_intercept`].
pub const INTERCEPT_LABEL: &str = "const";

/// Response vector and regressor matrix of a linear regression, aligned row by row.
#[derive(Clone, Debug)]
pub struct RegressionData {
    y: DVector<f64>,
    x: DMatrix<f64>,
    labels: Vec<String>,
}

impl RegressionData {
    /// Creates a `RegressionData` instance from validated components.
    ///
    /// `x` is used as given; add an intercept column yourself or go through the builder.
    pub fn new(y: DVector<f64>, x: DMatrix<f64>) -> Result<Self> {
        RegressionDataBuilder::new(y).regressors(x).build()
    }

    /// Number of observations `T`.
    pub fn nobs(&self) -> usize {
        self.y.len()
    }

    /// Number of regressors `k`, including the intercept column if present.
    pub fn nparams(&self) -> usize {
        self.x.ncols()
    }

    /// Returns the response vector `Y`.
    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// Returns the regressor matrix `X`.
    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    /// Column labels for `X`, one per regressor.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Builder that validates shapes and values before constructing [`RegressionData`].
#[derive(Debug)]
pub struct RegressionDataBuilder {
    y: DVector<f64>,
    x: Option<DMatrix<f64>>,
    labels: Option<Vec<String>>,
    intercept: bool,
}

impl RegressionDataBuilder {
    /// Start building regression data from the response vector.
    pub fn new(y: DVector<f64>) -> Self {
        Self {
            y,
            x: None,
            labels: None,
            intercept: false,
        }
    }

    /// Sets the regressor matrix (`T × k`).
    pub fn regressors(mut self, matrix: DMatrix<f64>) -> Self {
        self.x = Some(matrix);
        self
    }

    /// Sets labels for the regressor columns supplied through [`regressors`](Self::regressors).
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Prepends a column of ones labelled [`INTERCEPT_LABEL`].
    pub fn with_intercept(mut self) -> Self {
        self.intercept = true;
        self
    }

    /// Finalizes construction after validating shapes and finiteness.
    pub fn build(self) -> Result<RegressionData> {
        let nobs = self.y.len();
        let regressors = self
            .x
            .ok_or_else(|| RegressionError::dimension_mismatch("regressor matrix", nobs, 0))?;
        if regressors.nrows() != nobs {
            return Err(RegressionError::dimension_mismatch(
                "regressor rows",
                nobs,
                regressors.nrows(),
            ));
        }

        let mut labels = match self.labels {
            Some(labels) => {
                if labels.len() != regressors.ncols() {
                    return Err(RegressionError::dimension_mismatch(
                        "regressor labels",
                        regressors.ncols(),
                        labels.len(),
                    ));
                }
                labels
            }
            None => (1..=regressors.ncols()).map(|i| format!("x{i}")).collect(),
        };

        let x = if self.intercept {
            labels.insert(0, INTERCEPT_LABEL.to_string());
            regressors.insert_column(0, 1.0)
        } else {
            regressors
        };

        let nparams = x.ncols();
        if nparams == 0 || nobs < nparams {
            return Err(RegressionError::InsufficientObservations {
                required: nparams.max(1),
                found: nobs,
            });
        }

        ensure_finite_vector(&self.y, "response validation")?;
        ensure_finite(&x, "regressor validation")?;

        Ok(RegressionData {
            y: self.y,
            x,
            labels,
        })
    }
}
