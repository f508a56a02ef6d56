use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::weekly_review::{CreateWeeklyReview, UpdateWeeklyReview, WeeklyReview};
use services::services::mention_sync::Mentioned;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::ActorQuery;
use crate::{AppState, error::ApiError};

/// POST /api/families/{family_id}/weekly-reviews
/// One review per user and week; a second one is a conflict
pub async fn create_weekly_review(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
    Json(payload): Json<CreateWeeklyReview>,
) -> Result<ResponseJson<ApiResponse<Mentioned<WeeklyReview>>>, ApiError> {
    let review = state.weekly_reviews().create(family_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(review)))
}

pub async fn get_weekly_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Mentioned<WeeklyReview>>>, ApiError> {
    let review = state.weekly_reviews().get(review_id).await?;
    Ok(ResponseJson(ApiResponse::success(review)))
}

pub async fn update_weekly_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<UpdateWeeklyReview>,
) -> Result<ResponseJson<ApiResponse<Mentioned<WeeklyReview>>>, ApiError> {
    let review = state.weekly_reviews().update(review_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(review)))
}

pub async fn delete_weekly_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Query(actor): Query<ActorQuery>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.weekly_reviews().delete(review_id, actor.actor_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/families/{family_id}/weekly-reviews",
            post(create_weekly_review),
        )
        .route(
            "/weekly-reviews/{review_id}",
            get(get_weekly_review)
                .put(update_weekly_review)
                .delete(delete_weekly_review),
        )
}
