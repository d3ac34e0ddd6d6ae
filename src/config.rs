// src/config.rs

use crate::data::kraken::interval_minutes;
use anyhow::{anyhow, Result};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Values applied when a request leaves lambda or the confidence level out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportDefaults {
    pub lambda: f64,
    pub confidence_level: f64,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        // RiskMetrics decay and a 95% tail
        Self {
            lambda: 0.94,
            confidence_level: 0.95,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub defaults: ReportDefaults,
    pub kraken_pair: String,
    pub timespan: String,
    pub volatility_period: usize,
    pub request_timeout: Duration,
}

impl Settings {
    /// Loads settings from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key/value source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = ReportDefaults::default();

        let lambda: f64 = parse_or(&lookup, "DEFAULT_LAMBDA", fallback.lambda)?;
        if !(0.0..=1.0).contains(&lambda) {
            return Err(anyhow!("DEFAULT_LAMBDA must be within [0, 1], got {}", lambda));
        }

        let confidence_level: f64 =
            parse_or(&lookup, "DEFAULT_CONFIDENCE", fallback.confidence_level)?;
        if !(0.5..=0.999).contains(&confidence_level) {
            return Err(anyhow!(
                "DEFAULT_CONFIDENCE must be within [0.5, 0.999], got {}",
                confidence_level
            ));
        }

        let timespan = lookup("TIMESPAN").unwrap_or_else(|| "hour".to_string());
        interval_minutes(&timespan).map_err(|e| anyhow!("Invalid TIMESPAN: {}", e))?;

        let volatility_period: usize = parse_or(&lookup, "VOLATILITY_PERIOD", 30)?;
        if volatility_period < 2 {
            return Err(anyhow!(
                "VOLATILITY_PERIOD must be at least 2, got {}",
                volatility_period
            ));
        }

        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?;

        Ok(Self {
            defaults: ReportDefaults {
                lambda,
                confidence_level,
            },
            kraken_pair: lookup("KRAKEN_PAIR").unwrap_or_else(|| "ETHUSD".to_string()),
            timespan,
            volatility_period,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} must be a valid number, got {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}
