//! Volatility and tail-risk statistics over a price or return series.
//!
//! - [`calc`]: log-returns, historical and EWMA volatility, historical VaR and CVaR
//! - [`report`]: request shapes, report assembly and the uniform bad-request outcome
//! - [`config`]: environment driven settings
//! - [`data`]: market data used by the command line front end

pub mod calc;
pub mod config;
pub mod data;
pub mod error;
pub mod report;

pub use config::{ReportDefaults, Settings};
pub use error::{RiskError, RiskResult};
