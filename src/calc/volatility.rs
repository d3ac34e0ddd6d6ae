// src/calc/volatility.rs

use crate::calc::returns::validate_returns;
use crate::error::{ensure_finite, RiskError, RiskResult};
use log::debug;

/// Sample standard deviation of the returns (Bessel corrected, divides by n - 1).
///
/// Fewer than two returns carry no dispersion information and yield `0.0`.
pub fn hist_vol(returns: &[f64]) -> f64 {
    let n = returns.len();
    if n < 2 {
        return 0.0;
    }

    // Calculate mean
    let mean = returns.iter().sum::<f64>() / n as f64;

    // Calculate variance
    let variance = returns.iter().map(|&r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

    variance.sqrt()
}

/// Checks that the decay parameter lies in `[0, 1]`.
pub fn validate_lambda(lambda: f64) -> RiskResult<f64> {
    if (0.0..=1.0).contains(&lambda) {
        Ok(lambda)
    } else {
        Err(RiskError::InvalidDomain(format!(
            "lambda must be within [0, 1], got {}",
            lambda
        )))
    }
}

/// RiskMetrics style EWMA volatility.
///
/// Zero-mean recursive update starting from a variance of zero:
/// `var = lambda * var + (1 - lambda) * r^2`, walked in chronological order.
pub fn ewma_vol_recursive(returns: &[f64], lambda: f64) -> RiskResult<f64> {
    let lambda = validate_lambda(lambda)?;
    if returns.is_empty() {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    validate_returns(returns)?;

    let variance = returns
        .iter()
        .fold(0.0, |var, &r| lambda * var + (1.0 - lambda) * r * r);

    ensure_finite("ewma_vol", variance.sqrt())
}

/// EWMA volatility as a decay-weighted mean and variance.
///
/// The most recent return gets weight `1 - lambda`, the one before it
/// `(1 - lambda) * lambda`, and so on back to the oldest. Both moments are
/// normalised by the sum of the weights, so the weights need not sum to one.
pub fn ewma_vol_weighted(returns: &[f64], lambda: f64) -> RiskResult<f64> {
    let lambda = validate_lambda(lambda)?;
    let n = returns.len();
    if n == 0 {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    validate_returns(returns)?;

    let mut weights = vec![0.0; n];
    let mut weight = 1.0 - lambda;
    for slot in weights.iter_mut().rev() {
        *slot = weight;
        weight *= lambda;
    }

    let mut total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        // lambda == 1 zeroes every weight; use the non-decaying limit instead
        debug!(
            "EWMA weights sum to {} for lambda {}, falling back to uniform weights",
            total, lambda
        );
        weights.iter_mut().for_each(|w| *w = 1.0);
        total = n as f64;
    }

    let mean = weights
        .iter()
        .zip(returns)
        .map(|(w, r)| w * r)
        .sum::<f64>()
        / total;

    let variance = weights
        .iter()
        .zip(returns)
        .map(|(w, r)| w * (r - mean).powi(2))
        .sum::<f64>()
        / total;

    ensure_finite("ewma_vol", variance.sqrt())
}
