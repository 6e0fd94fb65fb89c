use crate::{
    clock::SimClock,
    config::{SimConfig, MONTH_KEYS},
    consumer::Consumer,
    rng::SubsystemRng,
    types::{month_key, ConsumerId, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledPurchase {
    pub consumer_id: ConsumerId,
    pub date:        SimDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseSchedule {
    /// Sorted by date; each consumer appears at most once.
    pub entries: Vec<ScheduledPurchase>,
    /// Size of the sampled buyer pool.
    pub buyer_count: usize,
    /// Buyers the monthly targets never reached, in sampling order.
    pub unassigned: Vec<ConsumerId>,
}

impl PurchaseSchedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Number of buyers drawn from a population of `population` consumers.
pub fn buyer_count(population: usize, buyer_share: f64) -> usize {
    (population as f64 * buyer_share).round_ties_even() as usize
}

/// Sample the buyer pool and spread it over the horizon.
///
/// Each calendar month gets a target of `round(buyers × share)`. On every
/// day the clock visits, the month's remaining target is divided by the
/// days left in that month (today included) to get today's purchases.
/// Targets are keyed by month of year, so a month that appears twice in
/// the horizon shares a single target.
pub fn build_purchase_schedule(
    rng: &mut SubsystemRng,
    config: &SimConfig,
    consumers: &[Consumer],
    end_date: SimDate,
) -> PurchaseSchedule {
    let num_buyers = buyer_count(consumers.len(), config.buyer_share).min(consumers.len());
    let buyers: Vec<ConsumerId> = rand::seq::index::sample(rng, consumers.len(), num_buyers)
        .into_iter()
        .map(|i| consumers[i].id)
        .collect();

    let mut remaining_target: BTreeMap<&str, u32> = MONTH_KEYS
        .iter()
        .map(|m| {
            let target = (num_buyers as f64 * config.purchase_share(m)).round_ties_even() as u32;
            (*m, target)
        })
        .collect();

    let mut clock = SimClock::new(end_date, config.horizon_days, config.step_days);
    let mut entries = Vec::with_capacity(num_buyers);
    let mut assigned = 0usize;

    while !clock.is_finished() {
        let date = clock.current_date;
        let key = month_key(date);
        if let Some(target) = remaining_target.get_mut(key.as_str()) {
            let days_left = clock.days_remaining_in_month();
            let today = (f64::from(*target) / f64::from(days_left)).round_ties_even() as u32;
            let today = today.min(*target);
            *target -= today;

            for _ in 0..today {
                if assigned < buyers.len() {
                    entries.push(ScheduledPurchase {
                        consumer_id: buyers[assigned],
                        date,
                    });
                    assigned += 1;
                }
            }
        }
        clock.advance();
    }

    entries.sort_by_key(|p| p.date);
    let unassigned = buyers[assigned..].to_vec();
    if !unassigned.is_empty() {
        log::warn!(
            "purchase schedule: {} of {num_buyers} buyers left unscheduled",
            unassigned.len()
        );
    }
    log::info!(
        "purchase schedule: {} purchases from a pool of {num_buyers}",
        entries.len()
    );

    PurchaseSchedule {
        entries,
        buyer_count: num_buyers,
        unassigned,
    }
}
