use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::goal::{CreateGoal, Goal, UpdateGoal};
use services::services::mention_sync::Mentioned;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::ActorQuery;
use crate::{AppState, error::ApiError};

/// POST /api/families/{family_id}/goals
pub async fn create_goal(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
    Json(payload): Json<CreateGoal>,
) -> Result<ResponseJson<ApiResponse<Mentioned<Goal>>>, ApiError> {
    let goal = state.goals().create(family_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(goal)))
}

/// GET /api/families/{family_id}/goals
pub async fn list_goals(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Goal>>>, ApiError> {
    let goals = state.goals().list_for_family(family_id).await?;
    Ok(ResponseJson(ApiResponse::success(goals)))
}

pub async fn get_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Mentioned<Goal>>>, ApiError> {
    let goal = state.goals().get(goal_id).await?;
    Ok(ResponseJson(ApiResponse::success(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<UpdateGoal>,
) -> Result<ResponseJson<ApiResponse<Mentioned<Goal>>>, ApiError> {
    let goal = state.goals().update(goal_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(goal)))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<Uuid>,
    Query(actor): Query<ActorQuery>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.goals().delete(goal_id, actor.actor_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/families/{family_id}/goals",
            post(create_goal).get(list_goals),
        )
        .route(
            "/goals/{goal_id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_goal_mentions_follow_edits() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/families/{}/goals", app.family.id),
                Some(json!({
                    "creator_id": app.frodo.id,
                    "title": "Reach Mount Doom with @Samwise",
                    "description": null,
                    "status": null,
                    "due_date": "2026-03-25",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let goal = &body["data"];
        assert_eq!(goal["title"], "Reach Mount Doom with @Samwise");
        assert_eq!(goal["status"], "not_started");
        assert_eq!(goal["mentions"][0]["mentioned_user_id"], json!(app.sam.id));
        assert_eq!(goal["mentions"][0]["user_id"], json!(app.frodo.id));
        assert_eq!(goal["newly_mentioned_user_ids"], json!([app.sam.id]));

        let goal_id = goal["id"].as_str().unwrap().to_string();
        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/goals/{goal_id}"),
                Some(json!({
                    "editor_id": app.sam.id,
                    "title": "Reach Mount Doom",
                    "description": null,
                    "status": "in_progress",
                    "due_date": null,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "in_progress");
        assert_eq!(body["data"]["due_date"], json!(null));
        assert_eq!(body["data"]["mentions"], json!([]));

        let (status, _) = app
            .send(
                Method::DELETE,
                &format!("/api/goals/{goal_id}?actor_id={}", app.frodo.id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app
            .send(Method::GET, &format!("/api/goals/{goal_id}"), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_non_member_is_forbidden() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/families/{}/goals", app.family.id),
                Some(json!({
                    "creator_id": app.gollum.id,
                    "title": "Precious",
                    "description": null,
                    "status": null,
                    "due_date": null,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_non_member_cannot_delete() {
        let app = TestApp::new().await;
        let (_, body) = app
            .send(
                Method::POST,
                &format!("/api/families/{}/goals", app.family.id),
                Some(json!({
                    "creator_id": app.sam.id,
                    "title": "Keep the pans clean",
                    "description": null,
                    "status": null,
                    "due_date": null,
                })),
            )
            .await;
        let goal_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                Method::DELETE,
                &format!("/api/goals/{goal_id}?actor_id={}", app.gollum.id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/goals/{goal_id}"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(Method::GET, &format!("/api/goals/{goal_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_blank_title_is_bad_request() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/families/{}/goals", app.family.id),
                Some(json!({
                    "creator_id": app.frodo.id,
                    "title": "   ",
                    "description": null,
                    "status": null,
                    "due_date": null,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
