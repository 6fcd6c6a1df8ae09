use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{Address, TimeMs, WellnessRecord};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct WellnessQuery {
    pub wallet: String,
}

pub async fn get_wellness(
    Query(params): Query<WellnessQuery>,
    State(state): State<AppState>,
) -> Result<Json<WellnessRecord>, AppError> {
    let wallet = Address::from_str(&params.wallet)
        .map_err(|_| AppError::BadRequest("Invalid wallet address".into()))?;
    let record = state.wellness.current(&wallet, TimeMs::now()).await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct RecomputeBody {
    pub wallet: Address,
}

pub async fn recompute(
    State(state): State<AppState>,
    Json(body): Json<RecomputeBody>,
) -> Result<Json<WellnessRecord>, AppError> {
    let record = state.wellness.recompute(&body.wallet, TimeMs::now()).await?;
    Ok(Json(record))
}
