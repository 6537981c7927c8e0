//! User profile service: profile, password, picture, preferences, and
//! account status management.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{User, UserPreferences, UserRole};
use shared::validation::validate_password;

/// User profile service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Input for updating profile fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub display_name: Option<String>,
}

/// Input for changing the password
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Input for setting the profile picture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePictureInput {
    pub profile_picture_url: Option<String>,
}

/// Input for activating or deactivating an account (admin only)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusInput {
    pub user_id: Uuid,
    pub is_active: bool,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    display_name: String,
    role: String,
    profile_picture_url: Option<String>,
    preferences: Json<UserPreferences>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_model(self) -> AppResult<User> {
        let role = self
            .role
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad user role: {}", self.role)))?;
        Ok(User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role,
            profile_picture_url: self.profile_picture_url,
            preferences: self.preferences.0,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

const PROFILE_COLUMNS: &str = "id, email, display_name, role, profile_picture_url, \
                               preferences, is_active, created_at";

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a user's profile
    pub async fn profile(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        row.into_model()
    }

    /// Update profile fields
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<User> {
        let current = self.profile(user_id).await?;
        let display_name = match input.display_name {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::Validation {
                    field: "displayName".to_string(),
                    message: "Display name cannot be empty".to_string(),
                })
            }
            Some(name) => name,
            None => current.display_name,
        };

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE users SET display_name = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(&display_name)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Change the password after verifying the current one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        validate_password(&input.new_password).map_err(|msg| AppError::Validation {
            field: "newPassword".to_string(),
            message: msg.to_string(),
        })?;

        let password_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(&input.current_password, &password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        // Changing the password invalidates all outstanding sessions
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(())
    }

    /// Set or clear the profile picture URL
    pub async fn set_profile_picture(
        &self,
        user_id: Uuid,
        input: ProfilePictureInput,
    ) -> AppResult<User> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE users SET profile_picture_url = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(&input.profile_picture_url)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        row.into_model()
    }

    /// Replace the user's preference document
    pub async fn set_preferences(
        &self,
        user_id: Uuid,
        preferences: UserPreferences,
    ) -> AppResult<User> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE users SET preferences = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(Json(&preferences))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        row.into_model()
    }

    /// Activate or deactivate an account. Admins only, and an admin may
    /// not deactivate themselves.
    pub async fn set_account_status(
        &self,
        acting_user_id: Uuid,
        acting_role: UserRole,
        input: AccountStatusInput,
    ) -> AppResult<User> {
        if acting_role != UserRole::Admin {
            return Err(AppError::InsufficientPermissions);
        }
        if input.user_id == acting_user_id && !input.is_active {
            return Err(AppError::Conflict(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE users SET is_active = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(input.is_active)
        .bind(input.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if !input.is_active {
            sqlx::query(
                "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
            )
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        row.into_model()
    }
}
