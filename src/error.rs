use thiserror::Error;

/// Failures surfaced by the risk computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Fewer observations than the estimator needs
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A value outside its mathematical domain (non-positive price, bad lambda, ...)
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Anything else that went wrong while evaluating an estimator
    #[error("Computation failed: {0}")]
    Computation(String),
}

impl RiskError {
    /// Stable machine-readable code for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::InsufficientData { .. } => "insufficient_data",
            RiskError::InvalidDomain(_) => "invalid_domain",
            RiskError::Computation(_) => "computation",
        }
    }
}

pub type RiskResult<T> = Result<T, RiskError>;

/// Rejects NaN and infinite estimator outputs.
pub fn ensure_finite(name: &str, value: f64) -> RiskResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::Computation(format!(
            "{} is not a finite number ({})",
            name, value
        )))
    }
}
