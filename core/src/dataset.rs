use crate::{
    consumer::{Consumer, Device, Gender},
    email::EmailTemplate,
    opening_model::{OpeningDecision, Personalization},
    types::{ConsumerId, EmailId, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One (consumer, dispatch) observation. Consumer fields are the values
/// seen at dispatch time, before the outcome is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservationRow {
    pub consumer_id: ConsumerId,
    pub age: u32,
    pub gender: Gender,
    pub income: u32,
    pub informative_perception: f64,
    pub mailing_frequency: u32,
    pub timespan: u32,
    pub product_purchase: bool,
    pub prior_email_opening: bool,
    pub device: Device,
    pub email_id: EmailId,
    pub subject_length: u32,
    pub information_value: i8,
    pub personalization: Personalization,
    pub sending_day: String,
    pub date: SimDate,
    pub opened: bool,
}

impl ObservationRow {
    pub fn capture(
        consumer: &Consumer,
        email: &EmailTemplate,
        decision: &OpeningDecision,
        sending_day: &str,
        date: SimDate,
    ) -> Self {
        Self {
            consumer_id: consumer.id,
            age: consumer.age,
            gender: consumer.gender,
            income: consumer.income,
            informative_perception: consumer.informative_perception,
            mailing_frequency: consumer.mailing_frequency,
            timespan: consumer.timespan,
            product_purchase: consumer.product_purchase,
            prior_email_opening: consumer.prior_email_opening,
            device: consumer.device,
            email_id: email.id,
            subject_length: email.length,
            information_value: email.information_value,
            personalization: decision.personalization,
            sending_day: sending_day.to_string(),
            date,
            opened: decision.opens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignOpenRate {
    pub date: SimDate,
    pub email_id: EmailId,
    pub open_rate: f64,
}

/// Running aggregates as of the end of one simulated day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAggregate {
    pub date: SimDate,
    pub average_open_rate: f64,
    pub average_timespan: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub total_mailings: u32,
    pub total_purchases: u32,
    pub simulated_days: u64,
    pub average_open_rate: f64,
    pub average_timespan: f64,
}

/// Everything a run produces, in simulated-date order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationDataset {
    pub rows: Vec<ObservationRow>,
    pub campaign_open_rates: Vec<CampaignOpenRate>,
    pub daily_aggregates: Vec<DailyAggregate>,
    /// Keyed "YYYY-MM"; every month the clock visits has an entry.
    pub mailings_per_month: BTreeMap<String, u32>,
    pub purchases_per_month: BTreeMap<String, u32>,
    pub summary: RunSummary,
}

impl SimulationDataset {
    pub fn open_count(&self) -> usize {
        self.rows.iter().filter(|r| r.opened).count()
    }

    /// First observation of each consumer, in order of first appearance.
    pub fn unique_consumers(&self) -> Vec<&ObservationRow> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.consumer_id))
            .collect()
    }

    pub fn rows_for_email(&self, email_id: EmailId) -> impl Iterator<Item = &ObservationRow> {
        self.rows.iter().filter(move |r| r.email_id == email_id)
    }
}
