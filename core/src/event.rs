//! The run event log.
//!
//! RULE: every state change the engine makes on a simulated day is
//! described by one SimEvent and appended to the store.

use crate::types::{ConsumerId, EmailId, RunId, SimDate, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants may be appended — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunInitialized {
        run_id: RunId,
        seed: u64,
        start_date: SimDate,
        end_date: SimDate,
    },
    SchedulesBuilt {
        consumers: usize,
        mailings: usize,
        purchases: usize,
        unassigned_buyers: usize,
    },
    EmailDispatched {
        date: SimDate,
        email_id: EmailId,
        recipients: usize,
        opens: usize,
        open_rate: f64,
    },
    PurchaseRecorded {
        date: SimDate,
        consumer_id: ConsumerId,
    },
}

impl SimEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. } => "run_initialized",
            SimEvent::SchedulesBuilt { .. } => "schedules_built",
            SimEvent::EmailDispatched { .. } => "email_dispatched",
            SimEvent::PurchaseRecorded { .. } => "purchase_recorded",
        }
    }
}

/// A persisted event log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub tick:       Tick,
    pub subsystem:  String,
    pub event_type: String,
    pub payload:    String,
}
