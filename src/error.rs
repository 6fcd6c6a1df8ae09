use crate::engine::ScheduleError;
use crate::orchestration::{FeedError, WellnessError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Validation(msg) => AppError::BadRequest(msg),
            ScheduleError::QuoteUnavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

impl From<WellnessError> for AppError {
    fn from(err: WellnessError) -> Self {
        match err {
            WellnessError::PersistenceConflict(_) => AppError::Conflict(err.to_string()),
            WellnessError::Db(e) => e.into(),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::NotFound(_) => AppError::NotFound(err.to_string()),
            FeedError::Validation(_) => AppError::BadRequest(err.to_string()),
            FeedError::InvalidTransition { .. } | FeedError::Terminal(_) | FeedError::Conflict(_) => {
                AppError::Conflict(err.to_string())
            }
            FeedError::Db(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_error_mapping() {
        let err: AppError = ScheduleError::Validation("interval too short".into()).into();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err: AppError = ScheduleError::QuoteUnavailable("rate limited".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_feed_error_mapping() {
        let err: AppError = FeedError::NotFound(7).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
        let err: AppError = FeedError::Terminal(7).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
