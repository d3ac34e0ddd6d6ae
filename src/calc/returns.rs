// src/calc/returns.rs

use crate::error::{RiskError, RiskResult};

/// Converts an ordered price series into log-returns.
///
/// `r[i - 1] = ln(price[i]) - ln(price[i - 1])`, so the output is one element
/// shorter than the input and keeps its order.
pub fn to_returns(prices: &[f64]) -> RiskResult<Vec<f64>> {
    if prices.len() < 2 {
        return Err(RiskError::InsufficientData {
            required: 2,
            actual: prices.len(),
        });
    }

    // Log is undefined for zero/negative prices, reject before producing NaN/-inf
    if let Some((idx, price)) = prices
        .iter()
        .enumerate()
        .find(|(_, &p)| !(p.is_finite() && p > 0.0))
    {
        return Err(RiskError::InvalidDomain(format!(
            "price at index {} must be a positive finite number, got {}",
            idx, price
        )));
    }

    let returns = prices
        .windows(2)
        .map(|pair| pair[1].ln() - pair[0].ln())
        .collect();

    Ok(returns)
}

/// Rejects return series holding NaN or infinite values.
pub fn validate_returns(returns: &[f64]) -> RiskResult<()> {
    match returns.iter().position(|r| !r.is_finite()) {
        Some(idx) => Err(RiskError::InvalidDomain(format!(
            "return at index {} must be a finite number, got {}",
            idx, returns[idx]
        ))),
        None => Ok(()),
    }
}
