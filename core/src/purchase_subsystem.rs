use crate::{
    error::SimResult,
    event::SimEvent,
    purchase_schedule::PurchaseSchedule,
    subsystem::{SimContext, SimSubsystem},
    types::SimDate,
};

/// Flags scheduled buyers as purchasers when their date comes up.
///
/// Every entry dated on or before the current day is consumed, so a
/// purchase placed on the horizon start (which the clock steps past)
/// lands on the first simulated day.
pub struct PurchaseSubsystem {
    schedule: PurchaseSchedule,
    cursor:   usize,
}

impl PurchaseSubsystem {
    pub fn new(schedule: PurchaseSchedule) -> Self {
        Self { schedule, cursor: 0 }
    }
}

impl SimSubsystem for PurchaseSubsystem {
    fn name(&self) -> &'static str {
        "purchase"
    }

    fn update(
        &mut self,
        date: SimDate,
        year_month: &str,
        ctx: &mut SimContext,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        while let Some(purchase) = self.schedule.entries.get(self.cursor) {
            if purchase.date > date {
                break;
            }
            self.cursor += 1;

            let Some(consumer) = ctx.consumer_mut(purchase.consumer_id) else {
                log::warn!(
                    "{date} purchase: consumer {} not in population, skipped",
                    purchase.consumer_id
                );
                continue;
            };
            if consumer.product_purchase {
                continue;
            }
            consumer.record_purchase(date);
            ctx.total_purchases += 1;
            *ctx.dataset
                .purchases_per_month
                .entry(year_month.to_string())
                .or_insert(0) += 1;
            events.push(SimEvent::PurchaseRecorded {
                date,
                consumer_id: purchase.consumer_id,
            });
        }

        if !events.is_empty() {
            log::debug!("{date} purchase: {} consumers bought", events.len());
        }
        Ok(events)
    }
}
