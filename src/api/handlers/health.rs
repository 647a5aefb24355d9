use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let watched = state.registry.watched_count().await;

    if db_ok {
        (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "watched_targets": watched })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "db": "disconnected",
                "watched_targets": watched,
            })),
        )
    }
}
