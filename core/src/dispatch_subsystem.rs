use crate::{
    clock::weekday_index,
    dataset::{CampaignOpenRate, ObservationRow},
    error::SimResult,
    event::SimEvent,
    mailing_schedule::MailingSchedule,
    opening_model::{decide, PersonalizationRule},
    subsystem::{SimContext, SimSubsystem},
    types::SimDate,
};

/// Sends each scheduled template to the whole population on its date.
pub struct DispatchSubsystem {
    schedule: MailingSchedule,
    cursor:   usize,
}

impl DispatchSubsystem {
    pub fn new(schedule: MailingSchedule) -> Self {
        Self { schedule, cursor: 0 }
    }
}

impl SimSubsystem for DispatchSubsystem {
    fn name(&self) -> &'static str {
        "dispatch"
    }

    fn update(
        &mut self,
        date: SimDate,
        year_month: &str,
        ctx: &mut SimContext,
    ) -> SimResult<Vec<SimEvent>> {
        let Some(mailing) = self.schedule.get(self.cursor) else {
            return Ok(vec![]);
        };
        if mailing.date != date {
            return Ok(vec![]);
        }
        let email = mailing.email.clone();
        self.cursor += 1;

        let sending_day = ctx.weekday_name(weekday_index(date)).to_string();
        let mut rows = Vec::with_capacity(ctx.consumers.len());
        let mut opens = 0usize;
        for consumer in &mut ctx.consumers {
            consumer.refresh_dispatch_stats(date);
            let rule = PersonalizationRule::for_consumer(consumer);
            let decision = decide(consumer, &email, &rule);
            rows.push(ObservationRow::capture(consumer, &email, &decision, &sending_day, date));
            if decision.opens {
                opens += 1;
            }
            consumer.record_dispatch(date, decision.opens);
        }

        let recipients = rows.len();
        let open_rate = if recipients > 0 {
            opens as f64 / recipients as f64
        } else {
            0.0
        };
        ctx.dataset.rows.extend(rows);
        ctx.dataset.campaign_open_rates.push(CampaignOpenRate {
            date,
            email_id: email.id,
            open_rate,
        });
        ctx.opening_rate_sum += open_rate;
        ctx.total_mailings += 1;
        *ctx.dataset
            .mailings_per_month
            .entry(year_month.to_string())
            .or_insert(0) += 1;

        log::debug!(
            "{date} dispatch: email {} to {recipients} consumers, {opens} opens ({:.1}%)",
            email.id,
            open_rate * 100.0
        );

        Ok(vec![SimEvent::EmailDispatched {
            date,
            email_id: email.id,
            recipients,
            opens,
            open_rate,
        }])
    }
}
