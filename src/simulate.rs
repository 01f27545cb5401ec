//! Seeded synthetic regression data with heteroskedastic, autocorrelated errors.

use nalgebra::{DMatrix, DVector};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::data::{RegressionData, RegressionDataBuilder};
use crate::error::{RegressionError, Result};

/// Data-generating process for [`simulate_regression`].
///
/// Regressors are independent standard normals; an intercept column is
/// prepended. Errors follow `e_t = rho · e_{t-1} + σ_t ε_t` with
/// `σ_t = noise_scale · (1 + heteroskedasticity · |x_{t,1}|)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of observations `T`.
    pub nobs: usize,
    /// True coefficients, intercept first.
    pub coefficients: Vec<f64>,
    /// AR(1) coefficient of the errors; must lie in `(-1, 1)`.
    pub rho: f64,
    /// Strength of the dependence of the error scale on the first regressor.
    pub heteroskedasticity: f64,
    /// Base error standard deviation.
    pub noise_scale: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nobs: 400,
            coefficients: vec![0.005, 0.2, 0.4],
            rho: 0.0,
            heteroskedasticity: 0.0,
            noise_scale: 0.01,
        }
    }
}

impl SimulationConfig {
    /// Override the sample length.
    pub fn with_nobs(mut self, nobs: usize) -> Self {
        self.nobs = nobs;
        self
    }

    /// Override the true coefficients (intercept first).
    pub fn with_coefficients(mut self, coefficients: Vec<f64>) -> Self {
        self.coefficients = coefficients;
        self
    }

    /// Override the AR(1) coefficient of the errors.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Override the heteroskedasticity strength.
    pub fn with_heteroskedasticity(mut self, heteroskedasticity: f64) -> Self {
        self.heteroskedasticity = heteroskedasticity;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(RegressionError::InvalidParameter(
                "at least the intercept coefficient is required".to_string(),
            ));
        }
        if self.nobs < self.coefficients.len() {
            return Err(RegressionError::InsufficientObservations {
                required: self.coefficients.len(),
                found: self.nobs,
            });
        }
        if !(self.rho.abs() < 1.0) {
            return Err(RegressionError::InvalidParameter(format!(
                "error autocorrelation must lie in (-1, 1), found {}",
                self.rho
            )));
        }
        if !(self.noise_scale >= 0.0) || !self.heteroskedasticity.is_finite() {
            return Err(RegressionError::InvalidParameter(
                "noise scale and heteroskedasticity must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Draws a regression sample from `config` using a seeded generator.
pub fn simulate_regression(config: &SimulationConfig, seed: u64) -> Result<RegressionData> {
    config.validate()?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let nobs = config.nobs;
    let nfactors = config.coefficients.len() - 1;

    let mut values: Vec<f64> = Vec::with_capacity(nobs * nfactors);
    for _ in 0..(nobs * nfactors) {
        values.push(StandardNormal.sample(&mut rng));
    }
    let factors = DMatrix::from_row_slice(nobs, nfactors, &values);

    let beta = DVector::from_column_slice(&config.coefficients);
    let mut y = DVector::from_element(nobs, beta[0]);
    if nfactors > 0 {
        y += &factors * beta.rows(1, nfactors);
    }

    let mut previous = 0.0_f64;
    for t in 0..nobs {
        let leverage = if nfactors > 0 { factors[(t, 0)].abs() } else { 0.0 };
        let scale = config.noise_scale * (1.0 + config.heteroskedasticity * leverage);
        let shock: f64 = StandardNormal.sample(&mut rng);
        let error = config.rho * previous + scale * shock;
        y[t] += error;
        previous = error;
    }

    let labels: Vec<String> = (1..=nfactors).map(|i| format!("f{i}")).collect();
    RegressionDataBuilder::new(y)
        .regressors(factors)
        .labels(labels)
        .with_intercept()
        .build()
}
