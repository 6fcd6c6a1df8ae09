//! Schedule parameter calculator.
//!
//! Turns a user's DCA intent plus one live quote into concrete execution
//! parameters. Pure: the caller supplies `now` and the quote, so repeated
//! calls with the same input always produce the same output.

use crate::domain::decimal::MAX_TOKEN_DECIMALS;
use crate::domain::{Address, Decimal, TimeMs};
use serde::{Deserialize, Serialize};

use super::ScheduleError;

/// Shortest allowed gap between cycles.
pub const MIN_INTERVAL_SECS: i64 = 60;

const SECS_PER_DAY: i64 = 86_400;

/// When a schedule stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopCondition {
    /// Run until this instant.
    EndDate(TimeMs),
    /// Run until this much source token has been spent.
    TotalAmount(Decimal),
}

/// User-entered schedule inputs plus the quote fetched for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleIntent {
    pub src_token: Address,
    pub dst_token: Address,
    /// Per-cycle spend, in source-token units.
    pub chunk_in: Decimal,
    pub interval_secs: i64,
    pub stop_condition: StopCondition,
    pub slippage_tolerance_percent: Decimal,
    /// Destination amount currently returned for one `chunk_in`.
    pub quote_amount: Option<Decimal>,
    pub dst_decimals: u32,
}

impl ScheduleIntent {
    /// Same-asset moves skip the quote and slippage entirely.
    pub fn is_same_token(&self) -> bool {
        self.src_token == self.dst_token
    }
}

/// Calculator output, consumed immediately by the TWAP assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleParameters {
    pub chunk_in: Decimal,
    pub interval_secs: i64,
    pub total_cycles: u64,
    pub estimated_duration_days: Decimal,
    pub total_principal: Decimal,
    pub min_output_per_cycle: Decimal,
}

/// Compute execution parameters for `intent` as of `now`.
///
/// # Errors
/// `Validation` for malformed input or a stop condition that cannot fit a
/// single cycle; `QuoteUnavailable` when a cross-token intent has no
/// usable quote.
pub fn compute_schedule_parameters(
    intent: &ScheduleIntent,
    now: TimeMs,
) -> Result<ScheduleParameters, ScheduleError> {
    if !intent.chunk_in.is_positive() {
        return Err(ScheduleError::Validation(
            "chunk amount must be positive".into(),
        ));
    }
    if intent.interval_secs < MIN_INTERVAL_SECS {
        return Err(ScheduleError::Validation(format!(
            "interval must be at least {} seconds, got {}",
            MIN_INTERVAL_SECS, intent.interval_secs
        )));
    }
    if intent.dst_decimals > MAX_TOKEN_DECIMALS {
        return Err(ScheduleError::Validation(format!(
            "destination decimals must be at most {}",
            MAX_TOKEN_DECIMALS
        )));
    }

    let total_cycles = count_cycles(intent, now)?;
    if total_cycles == 0 {
        return Err(ScheduleError::Validation(
            "stop condition leaves no room for a single cycle".into(),
        ));
    }

    let cycles = Decimal::from(total_cycles as i64);
    let total_principal = cycles
        .checked_mul(intent.chunk_in)
        .ok_or_else(|| ScheduleError::Validation("total principal overflows".into()))?;
    let estimated_duration_days = cycles
        .checked_mul(Decimal::from(intent.interval_secs))
        .and_then(|secs| secs.checked_div(Decimal::from(SECS_PER_DAY)))
        .ok_or_else(|| ScheduleError::Validation("schedule duration overflows".into()))?;

    let min_output_per_cycle = if intent.is_same_token() {
        intent.chunk_in.floor_to_decimals(intent.dst_decimals)
    } else {
        min_output_after_slippage(intent)?
    };

    Ok(ScheduleParameters {
        chunk_in: intent.chunk_in,
        interval_secs: intent.interval_secs,
        total_cycles,
        estimated_duration_days,
        total_principal,
        min_output_per_cycle,
    })
}

fn count_cycles(intent: &ScheduleIntent, now: TimeMs) -> Result<u64, ScheduleError> {
    match intent.stop_condition {
        StopCondition::EndDate(end) => {
            let remaining_ms = end.as_ms().saturating_sub(now.as_ms());
            if remaining_ms <= 0 {
                return Err(ScheduleError::Validation(
                    "end date must be in the future".into(),
                ));
            }
            let interval_ms = intent.interval_secs.saturating_mul(1000);
            Ok((remaining_ms / interval_ms) as u64)
        }
        StopCondition::TotalAmount(total) => {
            if !total.is_positive() {
                return Err(ScheduleError::Validation(
                    "total amount must be positive".into(),
                ));
            }
            let cycles = total
                .checked_div(intent.chunk_in)
                .map(|q| q.trunc())
                .and_then(|q| q.to_i64())
                .ok_or_else(|| ScheduleError::Validation("too many cycles".into()))?;
            Ok(cycles.max(0) as u64)
        }
    }
}

fn min_output_after_slippage(intent: &ScheduleIntent) -> Result<Decimal, ScheduleError> {
    let slippage = intent.slippage_tolerance_percent;
    if slippage.is_negative() || slippage > Decimal::hundred() {
        return Err(ScheduleError::Validation(format!(
            "slippage tolerance must be within 0-100, got {}",
            slippage
        )));
    }
    let quote = intent.quote_amount.ok_or_else(|| {
        ScheduleError::QuoteUnavailable("no quote supplied for cross-token schedule".into())
    })?;
    if !quote.is_positive() {
        return Err(ScheduleError::QuoteUnavailable(format!(
            "quote must be positive, got {}",
            quote
        )));
    }

    let keep = Decimal::from(1) - slippage / Decimal::hundred();
    Ok((quote * keep).floor_to_decimals(intent.dst_decimals))
}
