//! Shaped and truncated random samples.
//!
//! Every sampler here retries until it has collected `count` values in
//! range. The retry budget is bounded: a target range with almost no
//! probability mass fails with `SamplingExhausted` instead of looping.

use crate::{
    error::{SimError, SimResult},
    rng::SubsystemRng,
};
use rand::Rng;
use rand_distr::{Distribution, Gamma, SkewNormal, StandardNormal};
use statrs::distribution::{ContinuousCDF, Gamma as GammaCdf, Normal as NormalCdf};

/// Draw budget per requested value before a sampler gives up.
pub const MAX_DRAWS_PER_SAMPLE: u64 = 100_000;

/// Correlation between the latent age and income normals.
pub const AGE_INCOME_CORRELATION: f64 = 0.46;

pub const INCOME_MIN: f64 = 2083.0;
pub const INCOME_MEAN: f64 = 9688.0 - INCOME_MIN;
pub const INCOME_STD: f64 = 5459.0;

pub const AGE_MIN: f64 = 18.0;
pub const AGE_MEAN: f64 = 40.5 - AGE_MIN;
pub const AGE_STD: f64 = 10.9;

/// Keeps CDF outputs off 0 and 1 so the gamma quantile stays finite.
const CDF_CLAMP: f64 = 1e-12;

/// Bisection steps for the gamma quantile; the loop stops earlier once
/// the bracket can no longer shrink in f64.
const QUANTILE_MAX_STEPS: u32 = 200;

/// Parallel age and income samples from the copula.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeIncomeSample {
    pub ages: Vec<f64>,
    pub incomes: Vec<f64>,
}

/// Shape and scale of the gamma distribution with the given mean and
/// standard deviation (shape = mean²/variance, scale = variance/mean).
pub fn gamma_params(mean: f64, std_dev: f64) -> SimResult<(f64, f64)> {
    let variance = std_dev * std_dev;
    let shape = mean * mean / variance;
    let scale = variance / mean;
    if !(mean > 0.0 && variance > 0.0 && shape.is_finite() && scale.is_finite()) {
        return Err(SimError::Distribution(format!(
            "gamma needs positive mean and variance, got mean={mean} std_dev={std_dev}"
        )));
    }
    Ok((shape, scale))
}

/// `count` gamma samples that are all >= `min_value`.
pub fn truncated_gamma(
    rng: &mut SubsystemRng,
    mean: f64,
    std_dev: f64,
    min_value: f64,
    count: usize,
) -> SimResult<Vec<f64>> {
    let (shape, scale) = gamma_params(mean, std_dev)?;
    let gamma = Gamma::new(shape, scale)
        .map_err(|e| SimError::Distribution(format!("gamma(shape={shape}, scale={scale}): {e}")))?;

    let mut samples = Vec::with_capacity(count);
    let budget = draw_budget(count);
    let mut draws = 0u64;
    while samples.len() < count {
        if draws >= budget {
            return Err(SimError::SamplingExhausted {
                what: "truncated gamma",
                attempts: draws,
            });
        }
        draws += 1;
        let x = gamma.sample(rng);
        if x >= min_value {
            samples.push(x);
        }
    }
    Ok(samples)
}

/// Correlated age and income samples via a Gaussian copula.
///
/// A latent normal X drives income; Y = ρX + sqrt(1 − ρ²)Z drives age.
/// Each latent value is mapped through the standard normal CDF and then
/// through the quantile function of its gamma marginal, and finally
/// shifted by the marginal's minimum.
pub fn correlated_age_income(rng: &mut SubsystemRng, count: usize) -> SimResult<AgeIncomeSample> {
    let rho = AGE_INCOME_CORRELATION;
    let x: Vec<f64> = (0..count).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|xi| {
            let z = rng.sample::<f64, _>(StandardNormal);
            rho * xi + (1.0 - rho * rho).sqrt() * z
        })
        .collect();

    let normal = NormalCdf::new(0.0, 1.0)
        .map_err(|e| SimError::Distribution(format!("standard normal: {e}")))?;
    let income_marginal = gamma_marginal(INCOME_MEAN, INCOME_STD)?;
    let age_marginal = gamma_marginal(AGE_MEAN, AGE_STD)?;

    let incomes = x
        .iter()
        .map(|xi| gamma_quantile(&income_marginal, clamped_cdf(&normal, *xi)) + INCOME_MIN)
        .collect();
    let ages = y
        .iter()
        .map(|yi| gamma_quantile(&age_marginal, clamped_cdf(&normal, *yi)) + AGE_MIN)
        .collect();

    Ok(AgeIncomeSample { ages, incomes })
}

/// `count` skew-normal samples within [min_value, max_value].
/// `mean` is the location parameter, `std_dev` the scale.
pub fn truncated_skew_normal(
    rng: &mut SubsystemRng,
    mean: f64,
    std_dev: f64,
    skewness: f64,
    min_value: f64,
    max_value: f64,
    count: usize,
) -> SimResult<Vec<f64>> {
    if min_value > max_value {
        return Err(SimError::Distribution(format!(
            "empty range [{min_value}, {max_value}]"
        )));
    }
    let skew_normal = SkewNormal::new(mean, std_dev, skewness).map_err(|e| {
        SimError::Distribution(format!(
            "skew normal(location={mean}, scale={std_dev}, shape={skewness}): {e}"
        ))
    })?;

    let mut samples = Vec::with_capacity(count);
    let budget = draw_budget(count);
    let mut draws = 0u64;
    while samples.len() < count {
        if draws >= budget {
            return Err(SimError::SamplingExhausted {
                what: "truncated skew normal",
                attempts: draws,
            });
        }
        draws += 1;
        let x = skew_normal.sample(rng);
        if x >= min_value && x <= max_value {
            samples.push(x);
        }
    }
    Ok(samples)
}

fn gamma_marginal(mean: f64, std_dev: f64) -> SimResult<GammaCdf> {
    let (shape, scale) = gamma_params(mean, std_dev)?;
    // statrs parameterizes by rate.
    GammaCdf::new(shape, 1.0 / scale)
        .map_err(|e| SimError::Distribution(format!("gamma(shape={shape}, scale={scale}): {e}")))
}

/// Inverse CDF of `marginal` at `p`, bisected to full precision.
///
/// statrs has no closed-form gamma quantile and its default search stops
/// after 16 halvings, which leaves the income marginal about a unit off.
fn gamma_quantile(marginal: &GammaCdf, p: f64) -> f64 {
    let mut high = 1.0;
    while marginal.cdf(high) < p && high < f64::MAX / 2.0 {
        high *= 2.0;
    }
    let mut low = 0.0;
    for _ in 0..QUANTILE_MAX_STEPS {
        let mid = 0.5 * (low + high);
        if mid <= low || mid >= high {
            break;
        }
        if marginal.cdf(mid) < p {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}

fn clamped_cdf(normal: &NormalCdf, x: f64) -> f64 {
    normal.cdf(x).clamp(CDF_CLAMP, 1.0 - CDF_CLAMP)
}

fn draw_budget(count: usize) -> u64 {
    (count as u64).max(1).saturating_mul(MAX_DRAWS_PER_SAMPLE)
}
