//! Request orchestration: turns a request into the matching report, or into a
//! single bad-request outcome when any step fails.

use crate::calc::{
    ewma_vol_recursive, ewma_vol_weighted, hist_vol, historical_cvar, historical_var, to_returns,
    validate_lambda, validate_returns,
};
use crate::config::ReportDefaults;
use crate::error::{ensure_finite, RiskError, RiskResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading returns echoed back in a risk report.
pub const RETURNS_SAMPLE_LEN: usize = 5;

/// Which EWMA formulation a request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EwmaMethod {
    /// Decay-weighted mean and variance
    #[default]
    Weighted,
    /// Zero-mean recursive variance update
    Recursive,
}

impl EwmaMethod {
    /// Runs the selected formulation over `returns`.
    pub fn compute(self, returns: &[f64], lambda: f64) -> RiskResult<f64> {
        match self {
            EwmaMethod::Weighted => ewma_vol_weighted(returns, lambda),
            EwmaMethod::Recursive => ewma_vol_recursive(returns, lambda),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnsRequest {
    pub returns: Vec<f64>,
    #[serde(rename = "lambda_", alias = "lambda")]
    pub lambda: f64,
    #[serde(default)]
    pub ewma_method: EwmaMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricesRequest {
    pub prices: Vec<f64>,
    #[serde(default, rename = "lambda_", alias = "lambda")]
    pub lambda: Option<f64>,
    #[serde(default)]
    pub ewma_method: EwmaMethod,
}

/// Full report request; exactly one of `prices` and `returns` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskReportRequest {
    #[serde(default)]
    pub prices: Option<Vec<f64>>,
    #[serde(default)]
    pub returns: Option<Vec<f64>>,
    #[serde(default, rename = "lambda_", alias = "lambda")]
    pub lambda: Option<f64>,
    #[serde(default)]
    pub confidence_level: Option<f64>,
    #[serde(default)]
    pub ewma_method: EwmaMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityReport {
    pub hist_vol: f64,
    pub ewma_vol: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceVolatilityReport {
    pub n_returns: usize,
    pub hist_vol: f64,
    pub ewma_vol: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_prices: Option<usize>,
    pub n_returns: usize,
    pub lambda_used: f64,
    pub confidence_level: f64,
    pub hist_vol: f64,
    pub ewma_vol: f64,
    #[serde(rename = "VaR")]
    pub var: f64,
    #[serde(rename = "CVaR")]
    pub cvar: f64,
    pub returns_sample: Vec<f64>,
}

/// The uniform failure outcome handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadRequest {
    pub error: &'static str,
    pub detail: String,
}

impl From<RiskError> for BadRequest {
    fn from(err: RiskError) -> Self {
        BadRequest {
            error: err.kind(),
            detail: err.to_string(),
        }
    }
}

impl fmt::Display for BadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.detail)
    }
}

impl std::error::Error for BadRequest {}

pub type Outcome<T> = Result<T, BadRequest>;

fn reject(err: RiskError) -> BadRequest {
    warn!("Rejecting request: {}", err);
    BadRequest::from(err)
}

fn validate_confidence(confidence_level: f64) -> RiskResult<f64> {
    if (0.5..=0.999).contains(&confidence_level) {
        Ok(confidence_level)
    } else {
        Err(RiskError::InvalidDomain(format!(
            "confidence level must be within [0.5, 0.999], got {}",
            confidence_level
        )))
    }
}

fn volatility_pair(returns: &[f64], lambda: f64, method: EwmaMethod) -> RiskResult<(f64, f64)> {
    let hist = ensure_finite("hist_vol", hist_vol(returns))?;
    let ewma = method.compute(returns, lambda)?;
    Ok((hist, ewma))
}

/// Historical and EWMA volatility of a caller-supplied return series.
pub fn calculate_volatility(request: &ReturnsRequest) -> Outcome<VolatilityReport> {
    debug!(
        "Volatility request: {} returns, lambda {}, {:?} EWMA",
        request.returns.len(),
        request.lambda,
        request.ewma_method
    );

    let run = || -> RiskResult<VolatilityReport> {
        let lambda = validate_lambda(request.lambda)?;
        validate_returns(&request.returns)?;
        let (hist_vol, ewma_vol) = volatility_pair(&request.returns, lambda, request.ewma_method)?;
        Ok(VolatilityReport { hist_vol, ewma_vol })
    };

    run().map_err(reject)
}

/// Historical and EWMA volatility of the log-returns of a price series.
pub fn calculate_volatility_from_prices(
    request: &PricesRequest,
    defaults: &ReportDefaults,
) -> Outcome<PriceVolatilityReport> {
    debug!(
        "Volatility from prices request: {} prices, lambda {:?}, {:?} EWMA",
        request.prices.len(),
        request.lambda,
        request.ewma_method
    );

    let run = || -> RiskResult<PriceVolatilityReport> {
        let lambda = validate_lambda(request.lambda.unwrap_or(defaults.lambda))?;
        let returns = to_returns(&request.prices)?;
        let (hist_vol, ewma_vol) = volatility_pair(&returns, lambda, request.ewma_method)?;
        Ok(PriceVolatilityReport {
            n_returns: returns.len(),
            hist_vol,
            ewma_vol,
        })
    };

    run().map_err(reject)
}

/// Volatility plus historical VaR and CVaR, with the inputs echoed back.
pub fn calculate_risk_report(
    request: &RiskReportRequest,
    defaults: &ReportDefaults,
) -> Outcome<RiskReport> {
    debug!(
        "Risk report request: {:?} prices, {:?} returns, lambda {:?}, confidence {:?}",
        request.prices.as_ref().map(Vec::len),
        request.returns.as_ref().map(Vec::len),
        request.lambda,
        request.confidence_level
    );

    let run = || -> RiskResult<RiskReport> {
        let lambda = validate_lambda(request.lambda.unwrap_or(defaults.lambda))?;
        let confidence_level =
            validate_confidence(request.confidence_level.unwrap_or(defaults.confidence_level))?;

        let (n_prices, returns) = match (&request.prices, &request.returns) {
            (Some(prices), None) => (Some(prices.len()), to_returns(prices)?),
            (None, Some(returns)) => {
                validate_returns(returns)?;
                (None, returns.clone())
            }
            (Some(_), Some(_)) => {
                return Err(RiskError::InvalidDomain(
                    "supply either prices or returns, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(RiskError::InvalidDomain(
                    "either prices or returns must be supplied".to_string(),
                ))
            }
        };

        let (hist_vol, ewma_vol) = volatility_pair(&returns, lambda, request.ewma_method)?;
        let var = historical_var(&returns, confidence_level)?;
        let cvar = historical_cvar(&returns, confidence_level)?;

        Ok(RiskReport {
            n_prices,
            n_returns: returns.len(),
            lambda_used: lambda,
            confidence_level,
            hist_vol,
            ewma_vol,
            var,
            cvar,
            returns_sample: returns.iter().take(RETURNS_SAMPLE_LEN).copied().collect(),
        })
    };

    run().map_err(reject)
}
