use crate::{
    rng::SubsystemRng,
    types::{ConsumerId, SimDate},
};
use serde::{Deserialize, Serialize};

/// Trailing window for the mailing frequency count.
pub const FREQUENCY_WINDOW_DAYS: i64 = 30;

pub const MALE_PROBABILITY: f64 = 0.59;
pub const MOBILE_DEVICE_INFLUENCE: f64 = 0.9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub fn influence(self) -> f64 {
        match self {
            Device::Mobile => MOBILE_DEVICE_INFLUENCE,
            Device::Desktop => 0.0,
        }
    }
}

/// A simulated email recipient.
///
/// Demographics are fixed at construction; the dispatch fields are
/// mutated by the engine as mailings and purchases happen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub id: ConsumerId,
    pub age: u32,
    pub income: u32,
    pub gender: Gender,
    pub device: Device,
    pub device_influence: f64,
    pub informative_perception: f64,

    /// One entry per dispatch received, in send order.
    pub mailing_timestamps: Vec<SimDate>,
    pub mailing_frequency: u32,
    /// Days since the previous dispatch; 0 before the first one.
    pub timespan: u32,
    pub product_purchase: bool,
    pub purchase_date: Option<SimDate>,
    pub prior_email_opening: bool,
}

impl Consumer {
    pub fn new(id: ConsumerId, age: u32, income: u32, gender: Gender, device: Device) -> Self {
        Self {
            id,
            age,
            income,
            gender,
            device,
            device_influence: device.influence(),
            informative_perception: informative_perception(age, gender, income),
            mailing_timestamps: Vec::new(),
            mailing_frequency: 0,
            timespan: 0,
            product_purchase: false,
            purchase_date: None,
            prior_email_opening: false,
        }
    }

    /// Draw gender, then an age-conditioned device, for a consumer
    /// with the given age and income.
    pub fn generate(id: ConsumerId, age: u32, income: u32, rng: &mut SubsystemRng) -> Self {
        let gender = if rng.chance(MALE_PROBABILITY) {
            Gender::Male
        } else {
            Gender::Female
        };
        let device = if rng.chance(mobile_probability(age)) {
            Device::Mobile
        } else {
            Device::Desktop
        };
        Self::new(id, age, income, gender, device)
    }

    /// Recompute frequency and timespan as seen on `now`.
    pub fn refresh_dispatch_stats(&mut self, now: SimDate) {
        self.mailing_frequency = mailing_frequency(&self.mailing_timestamps, now);
        self.timespan = timespan_days(&self.mailing_timestamps, now);
    }

    /// Record the outcome of a dispatch and append it to the history.
    pub fn record_dispatch(&mut self, now: SimDate, opened: bool) {
        debug_assert!(
            self.mailing_timestamps.last().is_none_or(|last| *last <= now),
            "dispatch history must stay ordered"
        );
        self.prior_email_opening = opened;
        self.mailing_timestamps.push(now);
    }

    /// Mark the consumer as a buyer. A second call keeps the first date.
    pub fn record_purchase(&mut self, date: SimDate) {
        if self.product_purchase {
            return;
        }
        self.product_purchase = true;
        self.purchase_date = Some(date);
    }
}

/// Dispatches received within the trailing window ending at `now`.
pub fn mailing_frequency(timestamps: &[SimDate], now: SimDate) -> u32 {
    let cutoff = now - chrono::Duration::days(FREQUENCY_WINDOW_DAYS);
    timestamps.iter().filter(|ts| **ts >= cutoff).count() as u32
}

/// Whole days between the last dispatch and `now`, or 0 with no history.
pub fn timespan_days(timestamps: &[SimDate], now: SimDate) -> u32 {
    timestamps
        .last()
        .map(|last| (now - *last).num_days().max(0) as u32)
        .unwrap_or(0)
}

/// Probability that a consumer of this age mostly reads mail on mobile.
/// Hard-coded per age bracket, not interpolated.
pub fn mobile_probability(age: u32) -> f64 {
    match age {
        0..=19 => 0.942,
        20..=29 => 0.955,
        30..=39 => 0.96,
        40..=49 => 0.957,
        50..=59 => 0.928,
        60..=69 => 0.852,
        _ => 0.682,
    }
}

pub fn age_term(age: u32) -> f64 {
    if age < 44 {
        0.0
    } else if age < 55 {
        -1.2
    } else {
        -1.1
    }
}

pub fn gender_term(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 0.3,
        Gender::Female => 0.0,
    }
}

/// Income bands. 7583 and 15167 sit in gaps between bands and add nothing.
pub fn income_term(income: u32) -> f64 {
    match income {
        0..=3791 => 0.0,
        3792..=7582 => 0.4,
        7584..=15166 => -0.1,
        15168.. => -0.1,
        _ => 0.0,
    }
}

pub fn informative_perception(age: u32, gender: Gender, income: u32) -> f64 {
    age_term(age) + gender_term(gender) + income_term(income)
}
