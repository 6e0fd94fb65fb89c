use crate::{
    distribution::truncated_skew_normal,
    error::SimResult,
    rng::SubsystemRng,
    types::EmailId,
};
use serde::{Deserialize, Serialize};

pub const SUBJECT_LENGTH_MEAN: f64 = 7.9;
pub const SUBJECT_LENGTH_STD: f64 = 2.3;
pub const SUBJECT_LENGTH_SKEWNESS: f64 = -0.5;

/// Subject lines longer than this many words count as informative.
pub const INFORMATIVE_LENGTH: u32 = 7;

/// Relative weights of sending weekdays, Monday first.
pub const SENDING_DAY_WEIGHTS: [f64; 7] = [0.14, 0.15, 0.16, 0.17, 0.16, 0.10, 0.12];

/// One outgoing message. Immutable once scheduled; personalization is
/// resolved per recipient at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailTemplate {
    pub id: EmailId,
    /// Subject line length in words.
    pub length: u32,
    pub information_value: i8,
    /// Weekday index, 0 = Monday.
    pub sending_day: u32,
    pub sending_day_influence: f64,
}

impl EmailTemplate {
    pub fn new(id: EmailId, length: u32, sending_day: u32) -> Self {
        Self {
            id,
            length,
            information_value: information_value(length),
            sending_day,
            sending_day_influence: sending_day_influence(sending_day),
        }
    }

    pub fn generate(id: EmailId, rng: &mut SubsystemRng) -> SimResult<Self> {
        let raw = truncated_skew_normal(
            rng,
            SUBJECT_LENGTH_MEAN,
            SUBJECT_LENGTH_STD,
            SUBJECT_LENGTH_SKEWNESS,
            0.0,
            f64::INFINITY,
            1,
        )?;
        let length = raw[0].round_ties_even() as u32;
        let sending_day = rng.categorical(&SENDING_DAY_WEIGHTS) as u32;
        Ok(Self::new(id, length, sending_day))
    }

    pub fn is_informative(&self) -> bool {
        self.length > INFORMATIVE_LENGTH
    }
}

pub fn information_value(length: u32) -> i8 {
    if length > INFORMATIVE_LENGTH {
        1
    } else {
        -1
    }
}

/// Regression coefficient of the weekday an email goes out on.
pub fn sending_day_influence(sending_day: u32) -> f64 {
    match sending_day {
        2 => -0.5,
        4 => -0.1,
        5 | 6 => -0.3,
        _ => 0.0,
    }
}
