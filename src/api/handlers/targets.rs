use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct WatchedTarget {
    pub address: String,
    pub followers: usize,
}

#[derive(Debug, Serialize)]
pub struct TargetDetail {
    pub address: String,
    pub watching: bool,
    pub active_followers: usize,
}

/// GET /api/targets: every address with a live subscription.
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<WatchedTarget>>> {
    let data = state
        .registry
        .watched_targets()
        .await
        .into_iter()
        .map(|(address, followers)| WatchedTarget { address, followers })
        .collect();

    Json(ApiResponse {
        success: true,
        data,
    })
}

/// GET /api/targets/:address: subscription status plus persisted followers.
pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<TargetDetail>>, AppError> {
    let watching = state.registry.is_watching(&address).await;
    let followers = state
        .store
        .active_followers(&address)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if !watching && followers.is_empty() {
        return Err(AppError::NotFound(format!("target {address} is not copied")));
    }

    Ok(Json(ApiResponse {
        success: true,
        data: TargetDetail {
            address,
            watching,
            active_followers: followers.len(),
        },
    }))
}
