// src/calc/tail_risk.rs

use crate::calc::returns::validate_returns;
use crate::error::{ensure_finite, RiskError, RiskResult};

/// Empirical percentile (`q` in `[0, 100]`) with linear interpolation between
/// the two closest order statistics.
pub fn percentile(values: &[f64], q: f64) -> RiskResult<f64> {
    if values.is_empty() {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    validate_returns(values)?;
    if !(0.0..=100.0).contains(&q) {
        return Err(RiskError::InvalidDomain(format!(
            "percentile must be within [0, 100], got {}",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (sorted.len() - 1) as f64 * q / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    ensure_finite(
        "percentile",
        sorted[lower] + fraction * (sorted[upper] - sorted[lower]),
    )
}

fn tail_percentile(confidence_level: f64) -> RiskResult<f64> {
    if confidence_level > 0.0 && confidence_level < 1.0 {
        Ok((1.0 - confidence_level) * 100.0)
    } else {
        Err(RiskError::InvalidDomain(format!(
            "confidence level must be within (0, 1), got {}",
            confidence_level
        )))
    }
}

/// Historical Value-at-Risk: the `(1 - confidence_level)` quantile of the returns.
///
/// The value keeps its sign, so a loss comes back negative.
pub fn historical_var(returns: &[f64], confidence_level: f64) -> RiskResult<f64> {
    let q = tail_percentile(confidence_level)?;
    percentile(returns, q)
}

/// Historical Conditional VaR (expected shortfall).
///
/// Mean of the returns at or below the VaR threshold. An empty tail falls back
/// to the VaR value itself.
pub fn historical_cvar(returns: &[f64], confidence_level: f64) -> RiskResult<f64> {
    let var_value = historical_var(returns, confidence_level)?;

    let tail: Vec<f64> = returns
        .iter()
        .copied()
        .filter(|&r| r <= var_value)
        .collect();

    if tail.is_empty() {
        return Ok(var_value);
    }

    ensure_finite("CVaR", tail.iter().sum::<f64>() / tail.len() as f64)
}
