//! Pure computation engine(s) for schedule parameters and wellness.

use thiserror::Error;

pub mod schedule;
pub mod twap;
pub mod wellness;

pub use schedule::{
    compute_schedule_parameters, ScheduleIntent, ScheduleParameters, StopCondition,
    MIN_INTERVAL_SECS,
};
pub use twap::{assemble_twap_descriptor, Routing, RoutingMode, TwapDescriptor};
pub use wellness::{recompute_wellness, DECAY_INTERVAL_MS};

/// Failures raised by the calculator and assembler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Malformed or out-of-range intent; surface to the user as-is.
    #[error("Validation error: {0}")]
    Validation(String),
    /// No usable quote; the caller may retry.
    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),
}
