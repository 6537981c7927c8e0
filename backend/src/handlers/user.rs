//! HTTP handlers for user profile endpoints

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{
    AccountStatusInput, ChangePasswordInput, ProfilePictureInput, UpdateProfileInput,
};
use crate::services::UserService;
use crate::AppState;
use shared::models::{User, UserPreferences};

/// Get the current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service.profile(current_user.0.user_id).await?;
    Ok(Json(user))
}

/// Update the current user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service.update_profile(current_user.0.user_id, input).await?;
    Ok(Json(user))
}

/// Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<Json<Value>> {
    let service = UserService::new(state.db);
    service.change_password(current_user.0.user_id, input).await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

/// Set or clear the profile picture
pub async fn set_profile_picture(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProfilePictureInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service
        .set_profile_picture(current_user.0.user_id, input)
        .await?;
    Ok(Json(user))
}

/// Replace the current user's preference document
pub async fn update_preferences(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(preferences): Json<UserPreferences>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service
        .set_preferences(current_user.0.user_id, preferences)
        .await?;
    Ok(Json(user))
}

/// Activate or deactivate an account (admin only)
pub async fn set_account_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AccountStatusInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service
        .set_account_status(current_user.0.user_id, current_user.0.role, input)
        .await?;
    Ok(Json(user))
}
