//! The simulation engine.
//!
//! BUILD ORDER (each from its own RNG slot):
//!   1. Population          (RngSlot::Population)
//!   2. Mailing schedule    (RngSlot::Mailing)
//!   3. Purchase schedule   (RngSlot::Purchase)
//!
//! EXECUTION ORDER per step (fixed, never reordered):
//!   1. Clock advances by step_days.
//!   2. Dispatch subsystem  — sends the template due today, if any.
//!   3. Purchase subsystem  — flags buyers due today.
//!   4. Running aggregates are appended.
//!
//! RULES:
//!   - No randomness is drawn once the run starts stepping.
//!   - All run state lives in SimContext, owned by the engine.
//!   - All state changes are recorded in the event log.

use crate::{
    clock::SimClock,
    config::SimConfig,
    dataset::{DailyAggregate, RunSummary, SimulationDataset},
    dispatch_subsystem::DispatchSubsystem,
    error::SimResult,
    event::{EventLogEntry, SimEvent},
    mailing_schedule::build_mailing_schedule,
    population::build_population,
    purchase_schedule::build_purchase_schedule,
    purchase_subsystem::PurchaseSubsystem,
    rng::{RngBank, RngSlot},
    store::SimStore,
    subsystem::{SimContext, SimSubsystem},
    types::{year_month, RunId, SimDate, Tick},
};

/// Fixed end date for test runs so results never depend on the wall clock.
pub const TEST_END_DATE: (i32, u32, u32) = (2024, 6, 30);

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    pub store:    SimStore,
    config:       SimConfig,
    ctx:          SimContext,
    subsystems:   Vec<Box<dyn SimSubsystem>>,
    persisted:    bool,
}

impl SimEngine {
    /// Build a fully wired engine: population, both schedules and the
    /// subsystems that consume them. Fails before any state exists if
    /// the configuration or a distribution is invalid.
    pub fn build(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        end_date: SimDate,
        store: SimStore,
    ) -> SimResult<Self> {
        config.validate()?;
        let rng_bank = RngBank::new(seed);
        let clock = SimClock::new(end_date, config.horizon_days, config.step_days);

        let mut population_rng = rng_bank.for_slot(RngSlot::Population);
        let consumers = build_population(&mut population_rng, config.population_size)?;

        let mut mailing_rng = rng_bank.for_slot(RngSlot::Mailing);
        let mailing_schedule = build_mailing_schedule(&mut mailing_rng, &config, end_date)?;

        let mut purchase_rng = rng_bank.for_slot(RngSlot::Purchase);
        let purchase_schedule =
            build_purchase_schedule(&mut purchase_rng, &config, &consumers, end_date);

        let built = SimEvent::SchedulesBuilt {
            consumers: consumers.len(),
            mailings: mailing_schedule.len(),
            purchases: purchase_schedule.len(),
            unassigned_buyers: purchase_schedule.unassigned.len(),
        };

        let mut engine = Self {
            ctx: SimContext::new(consumers, config.weekday_names.clone()),
            run_id,
            clock,
            rng_bank,
            store,
            config,
            subsystems: Vec::new(),
            persisted: false,
        };

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(Box::new(DispatchSubsystem::new(mailing_schedule)));
        engine.register(Box::new(PurchaseSubsystem::new(purchase_schedule)));

        if !engine.store.run_exists(&engine.run_id)? {
            engine.store.insert_run(
                &engine.run_id,
                seed,
                env!("CARGO_PKG_VERSION"),
                engine.clock.start_date(),
                end_date,
            )?;
        }
        let init = SimEvent::RunInitialized {
            run_id: engine.run_id.clone(),
            seed,
            start_date: engine.clock.start_date(),
            end_date,
        };
        engine.log_event(0, "engine", &init)?;
        engine.log_event(0, "engine", &built)?;
        Ok(engine)
    }

    /// Engine over SimConfig::default_test() with an in-memory store and
    /// a fixed end date.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::build_test_with(run_id, seed, SimConfig::default_test())
    }

    pub fn build_test_with(run_id: RunId, seed: u64, config: SimConfig) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        let (y, m, d) = TEST_END_DATE;
        let end_date = SimDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| anyhow::anyhow!("invalid test end date"))?;
        Self::build(run_id, seed, config, end_date, store)
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push(subsystem);
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    /// Advance one step. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        let date = self.clock.advance();
        let tick = self.clock.elapsed_days;
        let ym = year_month(date);
        self.ctx.dataset.mailings_per_month.entry(ym.clone()).or_insert(0);
        self.ctx.dataset.purchases_per_month.entry(ym.clone()).or_insert(0);

        let mut tick_events = Vec::new();
        for subsystem in &mut self.subsystems {
            let new_events = subsystem.update(date, &ym, &mut self.ctx)?;
            for event in &new_events {
                let entry = EventLogEntry {
                    id:         None,
                    run_id:     self.run_id.clone(),
                    tick,
                    subsystem:  subsystem.name().to_string(),
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                };
                self.store.append_event(&entry)?;
            }
            tick_events.extend(new_events);
        }

        if self.ctx.total_mailings > 0 {
            let mailings = f64::from(self.ctx.total_mailings);
            self.ctx.dataset.daily_aggregates.push(DailyAggregate {
                date,
                average_open_rate: self.ctx.opening_rate_sum / mailings,
                average_timespan: tick as f64 / mailings,
            });
        }

        Ok(tick_events)
    }

    /// Run to the end of the horizon and persist the dataset.
    pub fn run(&mut self) -> SimResult<&SimulationDataset> {
        while !self.clock.is_finished() {
            self.tick()?;
        }
        self.ctx.dataset.summary = self.summary();

        if !self.persisted {
            self.store.save_dataset(&self.run_id, &self.ctx.dataset)?;
            self.persisted = true;
        }
        let s = &self.ctx.dataset.summary;
        log::info!(
            "run {}: {} mailings, {} purchases, {} days, open rate {:.3}",
            self.run_id,
            s.total_mailings,
            s.total_purchases,
            s.simulated_days,
            s.average_open_rate
        );
        Ok(&self.ctx.dataset)
    }

    /// Totals as of the current step.
    pub fn summary(&self) -> RunSummary {
        let mailings = self.ctx.total_mailings;
        let (average_open_rate, average_timespan) = if mailings > 0 {
            (
                self.ctx.opening_rate_sum / f64::from(mailings),
                self.clock.elapsed_days as f64 / f64::from(mailings),
            )
        } else {
            (0.0, 0.0)
        };
        RunSummary {
            total_mailings: mailings,
            total_purchases: self.ctx.total_purchases,
            simulated_days: self.clock.elapsed_days,
            average_open_rate,
            average_timespan,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn consumers(&self) -> &[crate::consumer::Consumer] {
        &self.ctx.consumers
    }

    pub fn dataset(&self) -> &SimulationDataset {
        &self.ctx.dataset
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_tick(
        &self,
        tick: Tick,
    ) -> SimResult<Vec<crate::event::EventLogEntry>> {
        self.store.events_for_tick(&self.run_id, tick)
    }

    fn log_event(&self, tick: Tick, subsystem: &str, event: &SimEvent) -> SimResult<()> {
        let entry = EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            tick,
            subsystem:  subsystem.to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        };
        self.store.append_event(&entry)
    }
}
