use thiserror::Error;

/// Unified error type for `hacols` operations.
#[derive(Debug, Error)]
pub enum RegressionError {
    /// Raised when provided arrays or matrices have incompatible dimensions.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension, usually implied by another input.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when a matrix that must be inverted is singular.
    #[error("matrix in {context} is singular")]
    SingularMatrix { context: &'static str },

    /// Raised when a negative lag count is requested for the Newey-West estimator.
    #[error("lag count must be non-negative, found {lags}")]
    InvalidLagCount { lags: i64 },

    /// Raised when a linear restriction is empty, too tall, or rank deficient.
    #[error("invalid restriction: {reason}")]
    InvalidRestriction { reason: String },

    /// Raised when there are fewer observations than the computation needs.
    #[error("need at least {required} observations, found {found}")]
    InsufficientObservations { required: usize, found: usize },

    /// Raised when inputs or results contain NaN or infinite values.
    #[error("encountered non-finite value during {context}")]
    NumericalError { context: &'static str },

    /// Raised when a scalar parameter is outside its admissible range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl RegressionError {
    /// Helper to format a [`DimensionMismatch`](RegressionError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper to raise when a matrix factorization fails due to singularity.
    pub fn singular(context: &'static str) -> Self {
        Self::SingularMatrix { context }
    }

    /// Helper for rejecting a malformed restriction.
    pub fn invalid_restriction(reason: impl Into<String>) -> Self {
        Self::InvalidRestriction {
            reason: reason.into(),
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, RegressionError>;
