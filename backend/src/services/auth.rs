//! Authentication service: registration, login, refresh token rotation,
//! and password reset requests.
//!
//! Refresh tokens are opaque random values. Only a SHA-256 digest is
//! stored, and each token is revoked when it is exchanged for a new pair.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::models::{User, UserPreferences, UserRole};
use shared::validation::{validate_email, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new user account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Option<UserRole>,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Input for exchanging a refresh token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Input for requesting a password reset
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordInput {
    pub email: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login/registration response: tokens plus the user profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: User,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    display_name: String,
    role: String,
    profile_picture_url: Option<String>,
    preferences: sqlx::types::Json<UserPreferences>,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl AccountRow {
    fn into_user(self) -> AppResult<User> {
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

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, display_name, role, \
                               profile_picture_url, preferences, is_active, created_at";

/// Refresh token lifetime for logins without remember-me
const SESSION_REFRESH_EXPIRY: i64 = 24 * 60 * 60;

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new user and log them in
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;
        if input.display_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "displayName".to_string(),
                message: "Display name is required".to_string(),
            });
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
        let role = input.role.unwrap_or_default();

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name, role, preferences)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.display_name)
        .bind(role.as_str())
        .bind(sqlx::types::Json(UserPreferences::default()))
        .fetch_one(&self.db)
        .await?;

        let user = row.into_user()?;
        let tokens = self.generate_tokens(user.id, user.role)?;
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);
        self.store_refresh_token(user.id, &tokens.refresh_token, expires_at)
            .await?;

        Ok(AuthResponse { tokens, user })
    }

    /// Authenticate with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !row.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(row.id)
            .execute(&self.db)
            .await?;

        // A session login gets a short-lived refresh token; remember-me
        // gets the full configured lifetime
        let refresh_expiry = refresh_expiry_seconds(input.remember_me, self.refresh_token_expiry);

        let user = row.into_user()?;
        let tokens = self.generate_tokens(user.id, user.role)?;
        let expires_at = Utc::now() + Duration::seconds(refresh_expiry);
        self.store_refresh_token(user.id, &tokens.refresh_token, expires_at)
            .await?;

        Ok(AuthResponse { tokens, user })
    }

    /// Exchange a refresh token for a new token pair. The old token is
    /// revoked so each refresh token works exactly once.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = Self::hash_token(refresh_token);

        let record = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            r#"
            SELECT rt.user_id, u.role, rt.expires_at
            FROM refresh_tokens rt
            JOIN users u ON u.id = rt.user_id
            WHERE rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidToken)?;

        let (user_id, role, expires_at) = record;
        let role: UserRole = role
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad user role: {}", role)))?;

        sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&self.db)
            .await?;

        // The new token inherits the old token's expiry, so a session
        // login stays capped no matter how often it rotates
        let tokens = self.generate_tokens(user_id, role)?;
        self.store_refresh_token(user_id, &tokens.refresh_token, expires_at)
            .await?;

        Ok(tokens)
    }

    /// Record a password reset request. Always succeeds from the caller's
    /// point of view so the endpoint does not reveal which emails exist.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let user_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.db)
                .await?;

        if let Some(user_id) = user_id {
            let reset_token = Uuid::new_v4().to_string();
            let token_hash = Self::hash_token(&reset_token);
            let expires_at = Utc::now() + Duration::hours(1);

            sqlx::query(
                r#"
                INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user_id)
            .bind(&token_hash)
            .bind(expires_at)
            .execute(&self.db)
            .await?;

            tracing::info!(%user_id, "password reset requested");
        }

        Ok(())
    }

    /// Generate an access/refresh token pair
    fn generate_tokens(&self, user_id: Uuid, role: UserRole) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let token_hash = Self::hash_token(token);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    fn hash_token(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("{:x}", digest)
    }
}

/// Refresh token lifetime for a fresh login
fn refresh_expiry_seconds(remember_me: bool, configured: i64) -> i64 {
    if remember_me {
        configured
    } else {
        SESSION_REFRESH_EXPIRY.min(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_stable_and_hex() {
        let a = AuthService::hash_token("some-token");
        let b = AuthService::hash_token("some-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_tokens_hash_differently() {
        assert_ne!(
            AuthService::hash_token("token-a"),
            AuthService::hash_token("token-b")
        );
    }

    #[test]
    fn test_session_login_expiry_is_capped_at_one_day() {
        let week = 7 * 24 * 60 * 60;
        assert_eq!(refresh_expiry_seconds(false, week), SESSION_REFRESH_EXPIRY);
        assert_eq!(refresh_expiry_seconds(true, week), week);
    }

    #[test]
    fn test_short_configured_expiry_wins_over_session_cap() {
        let hour = 60 * 60;
        assert_eq!(refresh_expiry_seconds(false, hour), hour);
    }
}
