use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::daily_plan::{
    CreateDailyPlan, CreateTopPriority, DailyPlanWithPriorities, TopPriority, UpdateDailyPlan,
    UpdateTopPriority,
};
use services::services::mention_sync::Mentioned;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::ActorQuery;
use crate::{AppState, error::ApiError};

/// POST /api/families/{family_id}/daily-plans
/// Priorities listed in the body are created in order, starting at 1
pub async fn create_daily_plan(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
    Json(payload): Json<CreateDailyPlan>,
) -> Result<ResponseJson<ApiResponse<Mentioned<DailyPlanWithPriorities>>>, ApiError> {
    let plan = state.daily_plans().create(family_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(plan)))
}

pub async fn get_daily_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Mentioned<DailyPlanWithPriorities>>>, ApiError> {
    let plan = state.daily_plans().get(plan_id).await?;
    Ok(ResponseJson(ApiResponse::success(plan)))
}

pub async fn update_daily_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<UpdateDailyPlan>,
) -> Result<ResponseJson<ApiResponse<Mentioned<DailyPlanWithPriorities>>>, ApiError> {
    let plan = state.daily_plans().update(plan_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(plan)))
}

pub async fn delete_daily_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(actor): Query<ActorQuery>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.daily_plans().delete(plan_id, actor.actor_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/daily-plans/{plan_id}/priorities
pub async fn add_priority(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<CreateTopPriority>,
) -> Result<ResponseJson<ApiResponse<Mentioned<TopPriority>>>, ApiError> {
    let priority = state.daily_plans().add_priority(plan_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(priority)))
}

pub async fn update_priority(
    State(state): State<AppState>,
    Path(priority_id): Path<Uuid>,
    Json(payload): Json<UpdateTopPriority>,
) -> Result<ResponseJson<ApiResponse<Mentioned<TopPriority>>>, ApiError> {
    let priority = state
        .daily_plans()
        .update_priority(priority_id, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(priority)))
}

pub async fn delete_priority(
    State(state): State<AppState>,
    Path(priority_id): Path<Uuid>,
    Query(actor): Query<ActorQuery>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state
        .daily_plans()
        .delete_priority(priority_id, actor.actor_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/families/{family_id}/daily-plans", post(create_daily_plan))
        .route(
            "/daily-plans/{plan_id}",
            get(get_daily_plan)
                .put(update_daily_plan)
                .delete(delete_daily_plan),
        )
        .route("/daily-plans/{plan_id}/priorities", post(add_priority))
        .route(
            "/priorities/{priority_id}",
            put(update_priority).delete(delete_priority),
        )
}
