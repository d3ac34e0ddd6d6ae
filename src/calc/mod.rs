pub mod returns;
pub mod tail_risk;
pub mod volatility;

pub use returns::{to_returns, validate_returns};
pub use tail_risk::{historical_cvar, historical_var, percentile};
pub use volatility::{ewma_vol_recursive, ewma_vol_weighted, hist_vol, validate_lambda};

#[cfg(test)]
mod returns_test;
#[cfg(test)]
mod tail_risk_test;
