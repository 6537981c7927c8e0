//! HTTP handlers for application settings

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SettingsService;
use crate::AppState;

/// Get the current user's settings document
pub async fn get_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Value>> {
    let service = SettingsService::new(state.db);
    let settings = service.get(current_user.0.user_id).await?;
    Ok(Json(settings))
}

/// Merge a settings patch into the stored document
pub async fn update_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(patch): Json<Value>,
) -> AppResult<Json<Value>> {
    let service = SettingsService::new(state.db);
    let settings = service.update(current_user.0.user_id, patch).await?;
    Ok(Json(settings))
}
