// src/calc/returns_test.rs

use super::returns::to_returns;
use crate::error::RiskError;
use rand::Rng;

#[test]
fn test_to_returns_with_given_prices() {
    let prices = [100.0, 101.0, 99.0, 102.0, 98.0];
    let returns = to_returns(&prices).expect("valid prices");

    let expected = [
        0.009950330853167877,
        -0.02000066670666989,
        0.02985296314968089,
        -0.04000533461369837,
    ];

    assert_eq!(returns.len(), expected.len());
    for (got, want) in returns.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-12, "got {}, want {}", got, want);
    }
}

#[test]
fn test_to_returns_rejects_short_series() {
    assert_eq!(
        to_returns(&[]),
        Err(RiskError::InsufficientData {
            required: 2,
            actual: 0
        })
    );
    assert_eq!(
        to_returns(&[100.0]),
        Err(RiskError::InsufficientData {
            required: 2,
            actual: 1
        })
    );
}

#[test]
fn test_to_returns_rejects_non_positive_prices() {
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let prices = [100.0, 101.0, bad, 102.0];
        match to_returns(&prices) {
            Err(RiskError::InvalidDomain(msg)) => assert!(msg.contains("index 2"), "{}", msg),
            other => panic!("expected InvalidDomain for {}, got {:?}", bad, other),
        }
    }
}

#[test]
fn test_to_returns_with_random_prices() {
    let mut rng = rand::thread_rng();

    // Generate 50 random prices between 50.0 and 150.0
    let prices: Vec<f64> = (0..50).map(|_| rng.gen_range(50.0..150.0)).collect();
    let returns = to_returns(&prices).expect("random prices are positive");

    assert_eq!(returns.len(), prices.len() - 1);

    // Cumulative log-returns give back the price ratios
    let mut cumulative = 0.0;
    for (i, r) in returns.iter().enumerate() {
        cumulative += r;
        let ratio = prices[i + 1] / prices[0];
        assert!(
            (cumulative.exp() - ratio).abs() < 1e-9,
            "ratio mismatch at {}: {} vs {}",
            i + 1,
            cumulative.exp(),
            ratio
        );
    }
}

#[test]
fn test_to_returns_constant_prices_are_zero() {
    let returns = to_returns(&[42.0; 6]).expect("valid prices");
    assert!(returns.iter().all(|&r| r == 0.0));
}

#[test]
fn test_validate_returns_flags_first_non_finite_value() {
    use super::returns::validate_returns;

    assert_eq!(validate_returns(&[0.01, -0.02, 0.0]), Ok(()));
    assert_eq!(validate_returns(&[]), Ok(()));

    match validate_returns(&[0.01, f64::INFINITY, f64::NAN]) {
        Err(RiskError::InvalidDomain(msg)) => assert!(msg.contains("index 1"), "{}", msg),
        other => panic!("expected InvalidDomain, got {:?}", other),
    }
}
