//! Small dense linear-algebra helpers shared by the estimators.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::{RegressionError, Result};

/// Equilibrated reciprocal condition numbers below this are treated as singular.
pub const SINGULAR_RCOND: f64 = 1e-14;

/// Raw reciprocal condition numbers below this trigger an ill-conditioning warning.
pub const WARN_RCOND: f64 = 1e-10;

/// Ratio of the smallest to the largest singular value, `0.0` for an all-zero matrix.
pub fn reciprocal_condition(matrix: &DMatrix<f64>) -> f64 {
    let singular_values = matrix.clone().svd(false, false).singular_values;
    if singular_values.is_empty() {
        return 0.0;
    }
    let max = singular_values.max();
    if max <= 0.0 {
        return 0.0;
    }
    singular_values.min() / max
}

/// Symmetric rescaling `D^-1/2 A D^-1/2` with `D = |diag(A)|`.
///
/// Rows and columns with a zero diagonal entry are left unscaled.
pub fn equilibrate(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let scales: Vec<f64> = matrix
        .diagonal()
        .iter()
        .map(|d| if *d == 0.0 { 1.0 } else { d.abs().sqrt() })
        .collect();
    DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |row, col| {
        matrix[(row, col)] / (scales[row] * scales[col])
    })
}

/// Conditioning diagnostics of a square matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conditioning {
    /// Reciprocal condition number of the matrix as given.
    pub raw: f64,
    /// Reciprocal condition number after [`equilibrate`]; invariant to the
    /// units of the underlying columns.
    pub equilibrated: f64,
}

impl Conditioning {
    pub fn of(matrix: &DMatrix<f64>) -> Self {
        Self {
            raw: reciprocal_condition(matrix),
            equilibrated: reciprocal_condition(&equilibrate(matrix)),
        }
    }

    /// Numerically singular whatever the scaling of its rows and columns.
    pub fn is_singular(&self) -> bool {
        self.equilibrated < SINGULAR_RCOND
    }

    /// Invertible, but badly conditioned in the units supplied.
    pub fn is_ill_conditioned(&self) -> bool {
        !self.is_singular() && self.raw < WARN_RCOND
    }
}

fn check_invertible(matrix: &DMatrix<f64>, context: &'static str) -> Result<()> {
    if !matrix.is_square() {
        return Err(RegressionError::dimension_mismatch(
            context,
            matrix.nrows(),
            matrix.ncols(),
        ));
    }
    ensure_finite(matrix, context)?;

    let conditioning = Conditioning::of(matrix);
    if conditioning.is_singular() {
        return Err(RegressionError::singular(context));
    }
    if conditioning.is_ill_conditioned() {
        warn!(
            "{context} is ill-conditioned (reciprocal condition number {:e}, {:e} after equilibration)",
            conditioning.raw, conditioning.equilibrated
        );
    }
    Ok(())
}

/// Inverts a symmetric positive-definite matrix through its Cholesky factor.
///
/// Singularity is judged on the equilibrated matrix, so a full-rank matrix
/// whose columns live on very different scales is inverted (with a warning)
/// rather than rejected.
pub fn invert_spd(matrix: DMatrix<f64>, context: &'static str) -> Result<DMatrix<f64>> {
    check_invertible(&matrix, context)?;
    let cholesky = nalgebra::linalg::Cholesky::new(matrix)
        .ok_or_else(|| RegressionError::singular(context))?;
    let inverse = cholesky.inverse();
    ensure_finite(&inverse, context)?;
    Ok(inverse)
}

/// Inverts a symmetric matrix, preferring Cholesky and falling back to LU
/// when the matrix is invertible but not positive definite.
pub fn invert_symmetric(matrix: DMatrix<f64>, context: &'static str) -> Result<DMatrix<f64>> {
    check_invertible(&matrix, context)?;
    let inverse = match nalgebra::linalg::Cholesky::new(matrix.clone()) {
        Some(cholesky) => cholesky.inverse(),
        None => {
            debug!("{context} is not positive definite; inverting through LU");
            matrix
                .lu()
                .try_inverse()
                .ok_or_else(|| RegressionError::singular(context))?
        }
    };
    ensure_finite(&inverse, context)?;
    Ok(inverse)
}

/// Fails with [`RegressionError::NumericalError`] if any entry is NaN or infinite.
pub fn ensure_finite(matrix: &DMatrix<f64>, context: &'static str) -> Result<()> {
    if matrix.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(RegressionError::NumericalError { context })
    }
}

/// Vector counterpart of [`ensure_finite`].
pub fn ensure_finite_vector(vector: &DVector<f64>, context: &'static str) -> Result<()> {
    if vector.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(RegressionError::NumericalError { context })
    }
}

/// Returns `(A + A') / 2`.
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    (matrix + matrix.transpose()) * 0.5
}

/// Per-observation score matrix `Z` with rows `Z_t = X_t · u_t`.
pub fn scores(x: &DMatrix<f64>, residuals: &DVector<f64>) -> Result<DMatrix<f64>> {
    if residuals.len() != x.nrows() {
        return Err(RegressionError::dimension_mismatch(
            "residual length",
            x.nrows(),
            residuals.len(),
        ));
    }
    Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |row, col| {
        x[(row, col)] * residuals[row]
    }))
}

/// Column means of a `T × q` matrix.
pub fn column_means(matrix: &DMatrix<f64>) -> DVector<f64> {
    let nobs = matrix.nrows() as f64;
    DVector::from_iterator(
        matrix.ncols(),
        matrix.column_iter().map(|column| column.sum() / nobs),
    )
}

/// Subtracts the column means from every row.
pub fn demean_columns(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let means = column_means(matrix);
    DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |row, col| {
        matrix[(row, col)] - means[col]
    })
}

/// Population variance (divisor `T`) of a vector around its own mean.
pub fn population_variance(values: &DVector<f64>) -> f64 {
    let n = values.len() as f64;
    let mean = values.sum() / n;
    values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n
}
