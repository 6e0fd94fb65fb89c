//! Shared primitive types used across the entire simulation.

use chrono::NaiveDate;

/// A simulation tick. One tick = one step of `step_days` simulated days;
/// stored as the elapsed-days counter at that step.
pub type Tick = u64;

/// Sequential consumer identifier, starting at 1.
pub type ConsumerId = u32;

/// Sequential email template identifier, starting at 1.
pub type EmailId = u32;

/// The canonical run identifier.
pub type RunId = String;

/// A calendar day in the simulated horizon.
pub type SimDate = NaiveDate;

/// "YYYY-MM" bucket key used for per-month counters.
pub fn year_month(date: SimDate) -> String {
    date.format("%Y-%m").to_string()
}

/// "MM" key used to look up month-of-year quotas.
pub fn month_key(date: SimDate) -> String {
    date.format("%m").to_string()
}
