//! Distribution sampler tests.

use mailsim_core::{
    distribution::{
        correlated_age_income, truncated_gamma, truncated_skew_normal, AGE_MIN, INCOME_MIN,
    },
    error::SimError,
    rng::SubsystemRng,
};

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let (ma, mb) = (mean(a), mean(b));
    let cov: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    let va: f64 = a.iter().map(|x| (x - ma).powi(2)).sum();
    let vb: f64 = b.iter().map(|y| (y - mb).powi(2)).sum();
    cov / (va.sqrt() * vb.sqrt())
}

#[test]
fn truncated_gamma_returns_exact_count_above_minimum() {
    let mut rng = SubsystemRng::new(11, 0);
    let samples = truncated_gamma(&mut rng, 40.53, 10.94, 18.0, 500).unwrap();
    assert_eq!(samples.len(), 500);
    assert!(samples.iter().all(|x| *x >= 18.0), "every sample must respect the minimum");
    let m = mean(&samples);
    assert!((35.0..47.0).contains(&m), "mean {m:.2} should stay near 40.5");
}

#[test]
fn truncated_gamma_rejects_invalid_parameters() {
    let mut rng = SubsystemRng::new(11, 0);
    let err = truncated_gamma(&mut rng, -1.0, 2.0, 0.0, 10).unwrap_err();
    assert!(matches!(err, SimError::Distribution(_)), "got {err:?}");
    let err = truncated_gamma(&mut rng, 5.0, 0.0, 0.0, 10).unwrap_err();
    assert!(matches!(err, SimError::Distribution(_)), "got {err:?}");
}

#[test]
fn truncated_gamma_gives_up_on_unreachable_minimum() {
    let mut rng = SubsystemRng::new(3, 0);
    // Mean 1, std 0.1: values above 1e6 never occur.
    let err = truncated_gamma(&mut rng, 1.0, 0.1, 1e6, 1).unwrap_err();
    assert!(matches!(err, SimError::SamplingExhausted { .. }), "got {err:?}");
}

#[test]
fn truncated_skew_normal_stays_in_range() {
    let mut rng = SubsystemRng::new(5, 1);
    let samples = truncated_skew_normal(&mut rng, 7.9, 2.3, -0.5, 0.0, 12.0, 1000).unwrap();
    assert_eq!(samples.len(), 1000);
    assert!(samples.iter().all(|x| (0.0..=12.0).contains(x)));
}

#[test]
fn truncated_skew_normal_rejects_empty_range() {
    let mut rng = SubsystemRng::new(5, 1);
    assert!(truncated_skew_normal(&mut rng, 7.9, 2.3, -0.5, 10.0, 1.0, 1).is_err());
}

#[test]
fn copula_respects_minimums_and_correlates_positively() {
    let mut rng = SubsystemRng::new(2024, 0);
    let sample = correlated_age_income(&mut rng, 5000).unwrap();
    assert_eq!(sample.ages.len(), 5000);
    assert_eq!(sample.incomes.len(), 5000);
    assert!(sample.ages.iter().all(|a| *a >= AGE_MIN));
    assert!(sample.incomes.iter().all(|i| *i >= INCOME_MIN));

    let r = correlation(&sample.ages, &sample.incomes);
    assert!(r > 0.3 && r < 0.6, "age/income correlation {r:.3} should be near 0.46");

    let mean_age = mean(&sample.ages);
    let mean_income = mean(&sample.incomes);
    assert!((38.0..43.0).contains(&mean_age), "mean age {mean_age:.1}");
    assert!((9000.0..10400.0).contains(&mean_income), "mean income {mean_income:.0}");
}

#[test]
fn copula_is_reproducible_for_a_seed() {
    let a = correlated_age_income(&mut SubsystemRng::new(9, 0), 200).unwrap();
    let b = correlated_age_income(&mut SubsystemRng::new(9, 0), 200).unwrap();
    assert_eq!(a, b);
}
