pub mod feeds;
pub mod health;
pub mod schedule;
pub mod wellness;

use crate::db::Repository;
use crate::orchestration::{FeedService, ScheduleService, WellnessService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub schedule: Arc<ScheduleService>,
    pub feeds: Arc<FeedService>,
    pub wellness: Arc<WellnessService>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        schedule: Arc<ScheduleService>,
        wellness: Arc<WellnessService>,
    ) -> Self {
        let feeds = Arc::new(FeedService::new(repo.clone(), wellness.clone()));
        Self {
            repo,
            schedule,
            feeds,
            wellness,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/schedules/preview", post(schedule::preview))
        .route("/v1/schedules/twap", post(schedule::twap))
        .route("/v1/feeds", get(feeds::list_feeds).post(feeds::create_feed))
        .route("/v1/feeds/:id", get(feeds::get_feed))
        .route("/v1/feeds/:id/status", post(feeds::update_status))
        .route("/v1/feeds/:id/executions", post(feeds::record_execution))
        .route("/v1/wellness", get(wellness::get_wellness))
        .route("/v1/wellness/recompute", post(wellness::recompute))
        .layer(cors)
        .with_state(state)
}
