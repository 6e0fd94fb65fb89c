//! Simulation clock — walks the calendar from (end − horizon) to end.

use crate::types::{SimDate, Tick};
use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_date: SimDate,
    pub end_date:     SimDate,
    pub step_days:    u32,
    /// Days simulated so far.
    pub elapsed_days: Tick,
}

impl SimClock {
    /// A clock positioned at the start of the horizon ending on `end_date`.
    pub fn new(end_date: SimDate, horizon_days: u32, step_days: u32) -> Self {
        Self {
            current_date: end_date - Duration::days(i64::from(horizon_days)),
            end_date,
            step_days,
            elapsed_days: 0,
        }
    }

    pub fn start_date(&self) -> SimDate {
        self.current_date - Duration::days(self.elapsed_days as i64)
    }

    /// True once the current date has reached the end of the horizon.
    pub fn is_finished(&self) -> bool {
        self.current_date >= self.end_date
    }

    /// Advance one step. Returns the new current date.
    /// The last step may land past `end_date` when the step size does
    /// not divide the horizon.
    pub fn advance(&mut self) -> SimDate {
        self.current_date += Duration::days(i64::from(self.step_days));
        self.elapsed_days += u64::from(self.step_days);
        self.current_date
    }

    /// Days left in the current month, counting today.
    pub fn days_remaining_in_month(&self) -> u32 {
        days_in_month(self.current_date) - self.current_date.day() + 1
    }
}

pub fn days_in_month(date: SimDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let next_month_start = if month == 12 {
        SimDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        SimDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next_month_start, SimDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// Weekday index with Monday = 0.
pub fn weekday_index(date: SimDate) -> u32 {
    date.weekday().num_days_from_monday()
}
