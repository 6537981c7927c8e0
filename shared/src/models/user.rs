//! User accounts and preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "USER_ID", alias = "user_id")]
    pub id: Uuid,
    #[serde(alias = "EMAIL")]
    pub email: String,
    #[serde(alias = "DISPLAY_NAME", alias = "display_name")]
    pub display_name: String,
    #[serde(default, alias = "ROLE")]
    pub role: UserRole,
    #[serde(alias = "PROFILE_PICTURE_URL", alias = "profile_picture_url")]
    pub profile_picture_url: Option<String>,
    #[serde(default, alias = "PREFERENCES")]
    pub preferences: UserPreferences,
    #[serde(alias = "IS_ACTIVE", alias = "is_active")]
    pub is_active: bool,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

/// Role of a user within the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Operator,
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Operator => "OPERATOR",
            UserRole::Viewer => "VIEWER",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "MANAGER" => Ok(UserRole::Manager),
            "OPERATOR" => Ok(UserRole::Operator),
            "VIEWER" => Ok(UserRole::Viewer),
            _ => Err("Unknown user role"),
        }
    }
}

/// Display and notification preferences (stored as a JSON document)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub theme: String,
    pub language: String,
    pub email_notifications: bool,
    pub low_stock_alerts: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            language: "en".to_string(),
            email_notifications: true,
            low_stock_alerts: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_default() {
        let p = UserPreferences::default();
        assert_eq!(p.theme, "light");
        assert!(p.low_stock_alerts);
    }

    #[test]
    fn test_preferences_partial_document() {
        let p: UserPreferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(p.theme, "dark");
        assert_eq!(p.language, "en");
    }
}
