use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::{
    daily_plans::DailyPlanError, database_validator::DatabaseValidationError,
    families::FamilyServiceError, goals::GoalServiceError, weekly_reviews::WeeklyReviewError,
};
use thiserror::Error;
use tracing::{debug, error};
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Family(#[from] FamilyServiceError),
    #[error(transparent)]
    Goal(#[from] GoalServiceError),
    #[error(transparent)]
    WeeklyReview(#[from] WeeklyReviewError),
    #[error(transparent)]
    DailyPlan(#[from] DailyPlanError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Family(err) => match err {
                FamilyServiceError::UserNotFound(_) | FamilyServiceError::FamilyNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                FamilyServiceError::EmailTaken(_) => StatusCode::CONFLICT,
                FamilyServiceError::Blank(_) => StatusCode::BAD_REQUEST,
                FamilyServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Goal(err) => match err {
                GoalServiceError::NotFound => StatusCode::NOT_FOUND,
                GoalServiceError::NotFamilyMember { .. } => StatusCode::FORBIDDEN,
                GoalServiceError::BlankTitle => StatusCode::BAD_REQUEST,
                GoalServiceError::Database(_) | GoalServiceError::MentionSync(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::WeeklyReview(err) => match err {
                WeeklyReviewError::NotFound => StatusCode::NOT_FOUND,
                WeeklyReviewError::NotFamilyMember { .. } => StatusCode::FORBIDDEN,
                WeeklyReviewError::AlreadyExists => StatusCode::CONFLICT,
                WeeklyReviewError::Database(_) | WeeklyReviewError::MentionSync(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::DailyPlan(err) => match err {
                DailyPlanError::NotFound | DailyPlanError::PriorityNotFound => {
                    StatusCode::NOT_FOUND
                }
                DailyPlanError::NotFamilyMember { .. } => StatusCode::FORBIDDEN,
                DailyPlanError::AlreadyExists => StatusCode::CONFLICT,
                DailyPlanError::BlankTitle => StatusCode::BAD_REQUEST,
                DailyPlanError::Database(_) | DailyPlanError::MentionSync(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::DatabaseValidation(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internals stay in the log, clients get a generic message
        let message = if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
            "Internal server error".to_string()
        } else {
            debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(GoalServiceError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(WeeklyReviewError::NotFamilyMember {
                family_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            })
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(DailyPlanError::AlreadyExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(FamilyServiceError::Blank("name")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_is_internal() {
        let response = ApiError::from(sqlx::Error::PoolClosed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
