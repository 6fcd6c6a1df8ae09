use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Address, TimeMs};
use crate::engine::{RoutingMode, ScheduleParameters, TwapDescriptor};
use crate::error::AppError;
use crate::orchestration::ScheduleRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersDto {
    pub total_cycles: u64,
    pub estimated_duration_days: String,
    pub total_principal: String,
    pub min_output_per_cycle: String,
    pub chunk_in: String,
    pub interval_secs: i64,
}

impl From<&ScheduleParameters> for ParametersDto {
    fn from(p: &ScheduleParameters) -> Self {
        Self {
            total_cycles: p.total_cycles,
            estimated_duration_days: p.estimated_duration_days.to_canonical_string(),
            total_principal: p.total_principal.to_canonical_string(),
            min_output_per_cycle: p.min_output_per_cycle.to_canonical_string(),
            chunk_in: p.chunk_in.to_canonical_string(),
            interval_secs: p.interval_secs,
        }
    }
}

/// Base-unit amounts travel as strings; they routinely exceed 2^53.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorDto {
    pub interval_seconds: i64,
    pub chunk_count: u64,
    pub chunk_in_amount: String,
    pub min_out_amount: String,
    pub recipient: Address,
    pub yield_deposit: Option<Address>,
}

impl From<&TwapDescriptor> for DescriptorDto {
    fn from(d: &TwapDescriptor) -> Self {
        Self {
            interval_seconds: d.interval_seconds,
            chunk_count: d.chunk_count,
            chunk_in_amount: d.chunk_in_amount.to_string(),
            min_out_amount: d.min_out_amount.to_string(),
            recipient: d.recipient.clone(),
            yield_deposit: d.yield_deposit.clone(),
        }
    }
}

pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ParametersDto>, AppError> {
    let params = state.schedule.preview(&request, TimeMs::now()).await?;
    Ok(Json(ParametersDto::from(&params)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwapBody {
    pub wallet: Address,
    #[serde(default = "default_routing")]
    pub routing: RoutingMode,
    pub schedule: ScheduleRequest,
}

fn default_routing() -> RoutingMode {
    RoutingMode::SelfTransfer
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwapResponse {
    pub parameters: ParametersDto,
    pub descriptor: DescriptorDto,
}

pub async fn twap(
    State(state): State<AppState>,
    Json(body): Json<TwapBody>,
) -> Result<Json<TwapResponse>, AppError> {
    let (params, descriptor) = state
        .schedule
        .build_twap(&body.schedule, &body.wallet, body.routing, TimeMs::now())
        .await?;
    Ok(Json(TwapResponse {
        parameters: ParametersDto::from(&params),
        descriptor: DescriptorDto::from(&descriptor),
    }))
}
