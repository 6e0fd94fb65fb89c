//! Subsystem trait and the shared run context.
//!
//! RULE: Every per-day behavior implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every step.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    consumer::Consumer,
    dataset::SimulationDataset,
    error::SimResult,
    event::SimEvent,
    types::{ConsumerId, SimDate},
};

/// All mutable state of one run. Owned by the engine and handed to
/// each subsystem in turn; nothing lives in globals.
#[derive(Debug, Clone, Default)]
pub struct SimContext {
    pub consumers: Vec<Consumer>,
    pub weekday_names: Vec<String>,
    pub dataset: SimulationDataset,
    /// Sum of per-campaign open rates, for the cumulative average.
    pub opening_rate_sum: f64,
    pub total_mailings: u32,
    pub total_purchases: u32,
}

impl SimContext {
    pub fn new(consumers: Vec<Consumer>, weekday_names: Vec<String>) -> Self {
        Self {
            consumers,
            weekday_names,
            ..Self::default()
        }
    }

    /// Consumers are stored in id order starting at 1.
    pub fn consumer_mut(&mut self, id: ConsumerId) -> Option<&mut Consumer> {
        let index = (id as usize).checked_sub(1)?;
        self.consumers.get_mut(index).filter(|c| c.id == id)
    }

    pub fn weekday_name(&self, weekday: u32) -> &str {
        self.weekday_names
            .get(weekday as usize)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per step by the engine.
    ///
    /// - `date`:       the simulated day being processed
    /// - `year_month`: the "YYYY-MM" bucket of `date`
    /// - `ctx`:        run state, already updated by earlier subsystems
    ///
    /// Returns the events describing what changed.
    fn update(
        &mut self,
        date: SimDate,
        year_month: &str,
        ctx: &mut SimContext,
    ) -> SimResult<Vec<SimEvent>>;
}
