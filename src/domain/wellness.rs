//! Wellness record and its event history.

use crate::domain::{Address, Decimal, TimeMs};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the score moved.
///
/// Variant order is the tie-break order used when sorting history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessReason {
    InstantTrade,
    RecurringCreated,
    CycleExecuted,
    ScheduleCompleted,
    ScheduleFailed,
    InactivityDecay,
}

impl WellnessReason {
    /// Display label shown next to the event.
    pub fn label(&self) -> &'static str {
        match self {
            WellnessReason::InstantTrade => "Instant trade",
            WellnessReason::RecurringCreated => "Created recurring schedule",
            WellnessReason::CycleExecuted => "Scheduled cycle executed",
            WellnessReason::ScheduleCompleted => "Schedule completed",
            WellnessReason::ScheduleFailed => "Schedule failed",
            WellnessReason::InactivityDecay => "Inactivity decay",
        }
    }
}

impl fmt::Display for WellnessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry in the regenerated history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessEvent {
    pub timestamp: TimeMs,
    pub delta: Decimal,
    pub reason: WellnessReason,
    pub detail: String,
}

/// At most one per wallet. `current_wellness` is always within `[0, 10]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessRecord {
    pub wallet: Address,
    pub current_wellness: Decimal,
    pub last_fed_time: TimeMs,
    pub last_recomputed_at: TimeMs,
    /// Newest first.
    pub history: Vec<WellnessEvent>,
}
