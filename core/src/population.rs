use crate::{
    consumer::Consumer,
    distribution::correlated_age_income,
    error::SimResult,
    rng::SubsystemRng,
};

/// Build `size` consumers with ids 1..=size.
///
/// Age and income come from the correlated copula sample and are
/// rounded to whole numbers; gender and device are drawn per consumer
/// afterwards, in id order, from the same stream.
pub fn build_population(rng: &mut SubsystemRng, size: usize) -> SimResult<Vec<Consumer>> {
    let sample = correlated_age_income(rng, size)?;

    let consumers: Vec<Consumer> = sample
        .ages
        .iter()
        .zip(sample.incomes.iter())
        .enumerate()
        .map(|(i, (age, income))| {
            let age = age.round_ties_even() as u32;
            let income = income.round_ties_even() as u32;
            Consumer::generate(i as u32 + 1, age, income, rng)
        })
        .collect();

    let mobile = consumers
        .iter()
        .filter(|c| c.device == crate::consumer::Device::Mobile)
        .count();
    log::info!(
        "population: built {} consumers ({mobile} mobile)",
        consumers.len()
    );
    Ok(consumers)
}
