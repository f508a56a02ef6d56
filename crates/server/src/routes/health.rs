use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use services::services::database_validator::{DatabaseValidator, ValidationResult};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/health
/// 503 while the schema is missing tables or indexes
pub async fn health(
    State(state): State<AppState>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<ValidationResult>>), ApiError> {
    let result = DatabaseValidator::new(state.db().pool.clone())
        .validate()
        .await?;

    let status = if result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, ResponseJson(ApiResponse::success(result))))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_health_ok() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["is_initialized"], true);
        assert_eq!(body["data"]["migrations_applied"], 3);
    }
}
