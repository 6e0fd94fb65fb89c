use crate::{
    clock::{weekday_index, SimClock},
    config::SimConfig,
    email::EmailTemplate,
    error::SimResult,
    rng::SubsystemRng,
    types::{month_key, year_month, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledMailing {
    pub email: EmailTemplate,
    pub date:  SimDate,
}

/// Chronological send calendar for the whole horizon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailingSchedule {
    pub entries: Vec<ScheduledMailing>,
    /// Scheduled sends per "YYYY-MM".
    pub per_month: BTreeMap<String, u32>,
    /// Template still waiting for its weekday when the horizon ended.
    pub dropped: Option<EmailTemplate>,
}

impl MailingSchedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduledMailing> {
        self.entries.get(index)
    }
}

/// Walk the horizon and place one template at a time on the first day
/// that matches its sending weekday while the month's quota has room.
///
/// The first candidate day is one step after the horizon start, the same
/// day the engine clock first visits.
pub fn build_mailing_schedule(
    rng: &mut SubsystemRng,
    config: &SimConfig,
    end_date: SimDate,
) -> SimResult<MailingSchedule> {
    let mut clock = SimClock::new(end_date, config.horizon_days, config.step_days);
    let mut schedule = MailingSchedule::default();

    let mut next_id = 1;
    let mut pending = EmailTemplate::generate(next_id, rng)?;
    let mut bucket = year_month(clock.current_date);
    let mut sent_this_month = 0u32;

    while !clock.is_finished() {
        let date = clock.advance();
        let ym = year_month(date);
        if ym != bucket {
            bucket = ym;
            sent_this_month = 0;
        }

        let quota = config.mailing_quota(&month_key(date));
        if pending.sending_day == weekday_index(date) && sent_this_month < quota {
            sent_this_month += 1;
            *schedule.per_month.entry(bucket.clone()).or_insert(0) += 1;
            next_id += 1;
            let email = std::mem::replace(&mut pending, EmailTemplate::generate(next_id, rng)?);
            schedule.entries.push(ScheduledMailing { email, date });
        }
    }

    log::info!(
        "mailing schedule: {} mailings over {} months",
        schedule.entries.len(),
        schedule.per_month.len()
    );
    log::debug!(
        "mailing schedule: template {} (weekday {}) left unsent at horizon end",
        pending.id,
        pending.sending_day
    );
    schedule.dropped = Some(pending);
    Ok(schedule)
}
