use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::post,
};
use db::models::{
    family::{AddFamilyMember, CreateFamily, Family, FamilyMembership},
    user::{CreateUser, User},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = state.families().create_user(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// POST /api/families
/// The owner joins as the family's first admin
pub async fn create_family(
    State(state): State<AppState>,
    Json(payload): Json<CreateFamily>,
) -> Result<ResponseJson<ApiResponse<Family>>, ApiError> {
    let family = state.families().create_family(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(family)))
}

/// GET /api/families/{family_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let members = state.families().members(family_id).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

/// POST /api/families/{family_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
    Json(payload): Json<AddFamilyMember>,
) -> Result<ResponseJson<ApiResponse<FamilyMembership>>, ApiError> {
    let membership = state.families().add_member(family_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(membership)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/families", post(create_family))
        .route(
            "/families/{family_id}/members",
            post(add_member).get(list_members),
        )
}
