use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{Address, FeedRecord, FeedStatus, NewFeed, TimeMs};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct FeedsQuery {
    pub wallet: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedsResponse {
    pub feed_count: usize,
    pub feeds: Vec<FeedRecord>,
}

pub async fn list_feeds(
    Query(params): Query<FeedsQuery>,
    State(state): State<AppState>,
) -> Result<Json<FeedsResponse>, AppError> {
    let wallet = Address::from_str(&params.wallet)
        .map_err(|_| AppError::BadRequest("Invalid wallet address".into()))?;
    let feeds = state.repo.list_feeds(&wallet).await?;
    Ok(Json(FeedsResponse {
        feed_count: feeds.len(),
        feeds,
    }))
}

pub async fn get_feed(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<FeedRecord>, AppError> {
    let feed = state
        .repo
        .get_feed(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feed {} not found", id)))?;
    Ok(Json(feed))
}

pub async fn create_feed(
    State(state): State<AppState>,
    Json(feed): Json<NewFeed>,
) -> Result<(StatusCode, Json<FeedRecord>), AppError> {
    let record = state.feeds.create(&feed, TimeMs::now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: FeedStatus,
}

pub async fn update_status(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(body): Json<StatusBody>,
) -> Result<Json<FeedRecord>, AppError> {
    let feed = state
        .feeds
        .transition(id, body.status, TimeMs::now())
        .await?;
    Ok(Json(feed))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionBody {
    #[serde(default)]
    pub next_fill_time: Option<TimeMs>,
}

pub async fn record_execution(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(body): Json<ExecutionBody>,
) -> Result<Json<FeedRecord>, AppError> {
    let feed = state
        .feeds
        .record_execution(id, body.next_fill_time, TimeMs::now())
        .await?;
    Ok(Json(feed))
}
