// src/calc/tail_risk_test.rs

use super::tail_risk::{historical_cvar, historical_var, percentile};
use crate::error::RiskError;
use rand::Rng;

const SCENARIO_RETURNS: [f64; 4] = [
    0.009950330853167877,
    -0.02000066670666989,
    0.02985296314968089,
    -0.04000533461369837,
];

#[test]
fn test_percentile_interpolates_linearly() {
    let values = [4.0, 1.0, 3.0, 2.0];
    assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
    assert_eq!(percentile(&values, 100.0).unwrap(), 4.0);
    assert!((percentile(&values, 50.0).unwrap() - 2.5).abs() < 1e-15);
    // rank (n - 1) * 0.1 = 0.3
    assert!((percentile(&values, 10.0).unwrap() - 1.3).abs() < 1e-12);
}

#[test]
fn test_percentile_rejects_bad_input() {
    assert_eq!(
        percentile(&[], 5.0),
        Err(RiskError::InsufficientData {
            required: 1,
            actual: 0
        })
    );
    assert!(matches!(
        percentile(&[1.0], 101.0),
        Err(RiskError::InvalidDomain(_))
    ));
}

#[test]
fn test_historical_var_scenario_golden_value() {
    let var = historical_var(&SCENARIO_RETURNS, 0.95).unwrap();
    assert!((var - -0.037004634427644095).abs() < 1e-12, "{}", var);
    assert!(var < 0.0, "losses keep their negative sign");
}

#[test]
fn test_historical_cvar_scenario_golden_value() {
    // Only the worst return sits at or below the interpolated VaR
    let cvar = historical_cvar(&SCENARIO_RETURNS, 0.95).unwrap();
    assert!((cvar - SCENARIO_RETURNS[3]).abs() < 1e-15, "{}", cvar);
}

#[test]
fn test_historical_var_and_cvar_on_frontend_sample() {
    let returns = [0.01, -0.02, 0.015, 0.005, -0.01, 0.02];

    let var = historical_var(&returns, 0.95).unwrap();
    assert!((var - -0.0175).abs() < 1e-12);
    assert!((historical_cvar(&returns, 0.95).unwrap() - -0.02).abs() < 1e-15);

    let var90 = historical_var(&returns, 0.90).unwrap();
    assert!((var90 - -0.015).abs() < 1e-12);
}

#[test]
fn test_high_confidence_approaches_minimum() {
    let min = SCENARIO_RETURNS.iter().copied().fold(f64::INFINITY, f64::min);
    let var = historical_var(&SCENARIO_RETURNS, 0.999999).unwrap();
    let cvar = historical_cvar(&SCENARIO_RETURNS, 0.999999).unwrap();
    assert!((var - min).abs() < 1e-6);
    assert!((cvar - min).abs() < 1e-15);
}

#[test]
fn test_single_observation() {
    assert_eq!(historical_var(&[-0.03], 0.95).unwrap(), -0.03);
    assert_eq!(historical_cvar(&[-0.03], 0.95).unwrap(), -0.03);
}

#[test]
fn test_tail_risk_rejects_bad_input() {
    let empty = RiskError::InsufficientData {
        required: 1,
        actual: 0,
    };
    assert_eq!(historical_var(&[], 0.95), Err(empty.clone()));
    assert_eq!(historical_cvar(&[], 0.95), Err(empty));

    for bad in [0.0, 1.0, -0.5, f64::NAN] {
        assert!(matches!(
            historical_var(&SCENARIO_RETURNS, bad),
            Err(RiskError::InvalidDomain(_))
        ));
        assert!(matches!(
            historical_cvar(&SCENARIO_RETURNS, bad),
            Err(RiskError::InvalidDomain(_))
        ));
    }
}

#[test]
fn test_tail_risk_ordering_with_random_returns() {
    let mut rng = rand::thread_rng();
    let returns: Vec<f64> = (0..100).map(|_| rng.gen_range(-0.05..0.05)).collect();

    let var95 = historical_var(&returns, 0.95).unwrap();
    let var99 = historical_var(&returns, 0.99).unwrap();
    let cvar95 = historical_cvar(&returns, 0.95).unwrap();

    assert!(var99 <= var95, "var99 {} > var95 {}", var99, var95);
    assert!(cvar95 <= var95, "cvar {} > var {}", cvar95, var95);
}

#[test]
fn test_tail_risk_rejects_non_finite_returns() {
    // A negative NaN would sort first and leak into the quantile
    assert!(matches!(
        historical_var(&[-f64::NAN, 0.01, 0.02], 0.95),
        Err(RiskError::InvalidDomain(_))
    ));
    assert!(matches!(
        historical_cvar(&[f64::NAN, 0.01], 0.5),
        Err(RiskError::InvalidDomain(_))
    ));
    assert!(matches!(
        percentile(&[0.01, f64::INFINITY], 50.0),
        Err(RiskError::InvalidDomain(_))
    ));
}

#[test]
fn test_percentile_overflow_is_a_computation_error() {
    // The gap between the order statistics overflows to infinity
    assert!(matches!(
        percentile(&[-1.7e308, 1.7e308], 50.0),
        Err(RiskError::Computation(_))
    ));
}
