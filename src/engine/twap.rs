//! TWAP descriptor assembly.
//!
//! Packages calculator output and the routing choice into the fixed-shape
//! bundle the order-signing layer embeds in the on-chain order. Amounts are
//! converted to base-unit integers exactly; nothing here signs or talks to
//! the network.

use crate::domain::Address;
use serde::{Deserialize, Serialize};

use super::schedule::ScheduleParameters;
use super::ScheduleError;

/// Where each cycle's output goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "address", rename_all = "camelCase")]
pub enum RoutingMode {
    /// Back to the initiating wallet.
    SelfTransfer,
    /// To another wallet (a "gift" schedule).
    ThirdParty(Address),
    /// To the initiating wallet via a deposit into this yield pool.
    YieldDeposit(Address),
}

/// Routing inputs for a single schedule-creation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    /// Wallet creating the schedule.
    pub wallet: Address,
    pub mode: RoutingMode,
    pub decimals_src: u32,
    pub decimals_dst: u32,
}

/// Parameter bundle embedded into the signed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwapDescriptor {
    pub interval_seconds: i64,
    pub chunk_count: u64,
    /// Source base units spent per cycle.
    pub chunk_in_amount: u128,
    /// Destination base units the cycle must return at minimum.
    pub min_out_amount: u128,
    pub recipient: Address,
    pub yield_deposit: Option<Address>,
}

/// Build the descriptor for `params` under `routing`.
///
/// # Errors
/// Returns `Validation` when an amount cannot be expressed exactly in the
/// token's base units, e.g. a chunk with more fractional digits than the
/// source token supports.
pub fn assemble_twap_descriptor(
    params: &ScheduleParameters,
    routing: &Routing,
) -> Result<TwapDescriptor, ScheduleError> {
    let chunk_in_amount = params
        .chunk_in
        .to_base_units(routing.decimals_src)
        .ok_or_else(|| {
            ScheduleError::Validation(format!(
                "chunk amount {} is not representable with {} decimals",
                params.chunk_in, routing.decimals_src
            ))
        })?;
    if chunk_in_amount == 0 {
        return Err(ScheduleError::Validation(
            "chunk amount rounds to zero base units".into(),
        ));
    }

    let min_out_amount = params
        .min_output_per_cycle
        .floor_to_decimals(routing.decimals_dst)
        .to_base_units(routing.decimals_dst)
        .ok_or_else(|| {
            ScheduleError::Validation(format!(
                "minimum output {} is not representable with {} decimals",
                params.min_output_per_cycle, routing.decimals_dst
            ))
        })?;

    let (recipient, yield_deposit) = match &routing.mode {
        RoutingMode::SelfTransfer => (routing.wallet.clone(), None),
        RoutingMode::ThirdParty(addr) => (addr.clone(), None),
        RoutingMode::YieldDeposit(pool) => (routing.wallet.clone(), Some(pool.clone())),
    };

    Ok(TwapDescriptor {
        interval_seconds: params.interval_secs,
        chunk_count: params.total_cycles,
        chunk_in_amount,
        min_out_amount,
        recipient,
        yield_deposit,
    })
}
