use std::str::FromStr;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    mention::{Mention, MentionableType},
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

const DEFAULT_RECEIVED_LIMIT: i64 = 20;
const MAX_RECEIVED_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub mentionable_type: String,
    pub mentionable_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReceivedQuery {
    pub limit: Option<i64>,
}

/// GET /api/mentions?mentionable_type=goal&mentionable_id=...
/// Mentions stored for one record, across all of its fields
pub async fn list_for_owner(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Mention>>>, ApiError> {
    let mentionable_type = MentionableType::from_str(&query.mentionable_type).map_err(|_| {
        ApiError::BadRequest(format!(
            "unknown mentionable_type: {}",
            query.mentionable_type
        ))
    })?;
    let mentionable_id = Uuid::parse_str(&query.mentionable_id).map_err(|_| {
        ApiError::BadRequest(format!("invalid mentionable_id: {}", query.mentionable_id))
    })?;

    let mentions =
        Mention::find_by_owner(&state.db().pool, mentionable_type, mentionable_id).await?;
    Ok(ResponseJson(ApiResponse::success(mentions)))
}

/// GET /api/users/{user_id}/mentions?limit=20
/// Newest first
pub async fn list_received(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ReceivedQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Mention>>>, ApiError> {
    let limit = match query.limit {
        None => DEFAULT_RECEIVED_LIMIT,
        Some(limit) if (1..=MAX_RECEIVED_LIMIT).contains(&limit) => limit,
        Some(limit) => {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {MAX_RECEIVED_LIMIT}, got {limit}"
            )));
        }
    };

    let pool = &state.db().pool;
    if User::find_by_id(pool, user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("user not found: {user_id}")));
    }

    let mentions = Mention::find_received(pool, user_id, limit).await?;
    Ok(ResponseJson(ApiResponse::success(mentions)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/mentions", get(list_for_owner))
        .route("/users/{user_id}/mentions", get(list_received))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_owner_and_received_views() {
        let app = TestApp::new().await;
        let (_, body) = app
            .send(
                Method::POST,
                &format!("/api/families/{}/goals", app.family.id),
                Some(json!({
                    "creator_id": app.sam.id,
                    "title": "Garden with @FrodoBaggins",
                    "description": "Ask @frodo about the roses",
                })),
            )
            .await;
        let goal_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                Method::GET,
                &format!("/api/mentions?mentionable_type=goal&mentionable_id={goal_id}"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let fields: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text_field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["description", "title"]);

        let (status, body) = app
            .send(
                Method::GET,
                &format!("/api/users/{}/mentions?limit=1", app.frodo.id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["user_id"], json!(app.sam.id));
    }

    #[tokio::test]
    async fn test_bad_queries() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(
                Method::GET,
                &format!(
                    "/api/mentions?mentionable_type=comment&mentionable_id={}",
                    app.family.id
                ),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "unknown mentionable_type: comment");

        let (status, _) = app
            .send(
                Method::GET,
                &format!("/api/users/{}/mentions?limit=0", app.frodo.id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                Method::GET,
                &format!("/api/users/{}/mentions", uuid::Uuid::new_v4()),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
