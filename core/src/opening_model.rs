//! Logistic opening model.
//!
//! logit = INTERCEPT + perceived value + personalization value
//!       + sending day influence + frequency term + timespan term
//!       + prior opening influence + device influence
//!
//! The decision is the rounded probability, i.e. the modal outcome.
//! No randomness is drawn here.

use crate::{consumer::Consumer, email::EmailTemplate};
use serde::{Deserialize, Serialize};

pub const INTERCEPT: f64 = -1.6;

/// Timespans below this many days scale linearly; longer ones saturate.
pub const TIMESPAN_SATURATION_DAYS: u32 = 3;
pub const TIMESPAN_COEFFICIENT: f64 = 0.8;
pub const SATURATED_TIMESPAN_TERM: f64 = 2.4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Personalization {
    None,
    #[serde(rename = "product-based")]
    ProductBased,
}

impl Personalization {
    pub fn label(self) -> &'static str {
        match self {
            Personalization::None => "none",
            Personalization::ProductBased => "product-based",
        }
    }
}

/// Coefficients that depend on whether the recipient has bought.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalizationRule {
    pub personalization: Personalization,
    pub value: f64,
    pub frequency_influence: f64,
    pub frequency_sqr_influence: f64,
    pub prior_opening_influence: f64,
}

impl PersonalizationRule {
    pub const PRODUCT_BASED: Self = Self {
        personalization: Personalization::ProductBased,
        value: 0.2,
        frequency_influence: 0.3,
        frequency_sqr_influence: -0.1,
        prior_opening_influence: 0.7,
    };

    pub const NONE: Self = Self {
        personalization: Personalization::None,
        value: 0.0,
        frequency_influence: 0.2,
        frequency_sqr_influence: -0.1,
        prior_opening_influence: 0.9,
    };

    /// Rule in force for a consumer with the given purchase state.
    pub fn resolve(product_purchase: bool) -> Self {
        if product_purchase {
            Self::PRODUCT_BASED
        } else {
            Self::NONE
        }
    }

    pub fn for_consumer(consumer: &Consumer) -> Self {
        Self::resolve(consumer.product_purchase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningDecision {
    pub opens: bool,
    pub personalization: Personalization,
    pub logit: f64,
    pub probability: f64,
}

/// Value the consumer perceives in the subject line.
///
/// Long subjects pass the perception through, short ones flip its sign.
/// Both negative-perception branches are kept as listed.
pub fn perceived_value(informative_perception: f64, email: &EmailTemplate) -> f64 {
    let p = informative_perception;
    let long = email.is_informative();
    if p > 0.0 && long {
        p
    } else if p < 0.0 && !long {
        -p
    } else if p > 0.0 && !long {
        -p
    } else if p < 0.0 && long {
        p
    } else {
        0.0
    }
}

pub fn timespan_term(timespan: u32) -> f64 {
    if timespan < TIMESPAN_SATURATION_DAYS {
        f64::from(timespan) * TIMESPAN_COEFFICIENT
    } else {
        SATURATED_TIMESPAN_TERM
    }
}

pub fn frequency_term(frequency: u32, rule: &PersonalizationRule) -> f64 {
    let f = f64::from(frequency);
    f * rule.frequency_influence + f * f * rule.frequency_sqr_influence
}

pub fn logistic(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

/// Opening decision for `consumer` receiving `email` under `rule`.
/// Reads the consumer's frequency and timespan as last refreshed.
pub fn decide(
    consumer: &Consumer,
    email: &EmailTemplate,
    rule: &PersonalizationRule,
) -> OpeningDecision {
    let prior_opening = if consumer.prior_email_opening {
        rule.prior_opening_influence
    } else {
        0.0
    };

    let logit = INTERCEPT
        + perceived_value(consumer.informative_perception, email)
        + rule.value
        + email.sending_day_influence
        + frequency_term(consumer.mailing_frequency, rule)
        + timespan_term(consumer.timespan)
        + prior_opening
        + consumer.device_influence;

    let probability = logistic(logit);
    OpeningDecision {
        opens: probability.round_ties_even() >= 1.0,
        personalization: rule.personalization,
        logit,
        probability,
    }
}
