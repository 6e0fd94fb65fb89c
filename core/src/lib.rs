//! Synthetic email-marketing dataset generator.
//!
//! Builds a correlated consumer population, a quota-constrained mailing
//! calendar and a purchase calendar, then steps day by day through the
//! horizon, recording one observation per (consumer, dispatch).

pub mod clock;
pub mod config;
pub mod consumer;
pub mod dataset;
pub mod dispatch_subsystem;
pub mod distribution;
pub mod email;
pub mod engine;
pub mod error;
pub mod event;
pub mod mailing_schedule;
pub mod opening_model;
pub mod population;
pub mod purchase_schedule;
pub mod purchase_subsystem;
pub mod rng;
pub mod store;
pub mod subsystem;
pub mod types;
