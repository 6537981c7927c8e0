//! Per-user application settings stored as a JSON document.
//!
//! Updates merge into the stored document rather than replacing it, so a
//! client can PUT a partial object without clobbering unrelated keys.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Settings service
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

impl SettingsService {
    /// Create a new SettingsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get the settings document, or an empty object if none is stored
    pub async fn get(&self, user_id: Uuid) -> AppResult<Value> {
        let stored = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT settings FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(stored.map(|j| j.0).unwrap_or_else(|| Value::Object(Default::default())))
    }

    /// Merge the patch into the stored document and return the result
    pub async fn update(&self, user_id: Uuid, patch: Value) -> AppResult<Value> {
        if !patch.is_object() {
            return Err(AppError::ValidationError(
                "Settings must be a JSON object".to_string(),
            ));
        }

        let mut merged = self.get(user_id).await?;
        merge_documents(&mut merged, patch);

        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, settings)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET settings = $2, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(Json(&merged))
        .execute(&self.db)
        .await?;

        Ok(merged)
    }
}

/// Shallow-merge for top-level keys, recursing into nested objects.
/// Explicit nulls remove keys.
fn merge_documents(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                if value.is_null() {
                    base_map.remove(&key);
                } else if let Some(existing) = base_map.get_mut(&key) {
                    merge_documents(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_adds_and_overwrites() {
        let mut base = json!({"theme": "light", "pageSize": 20});
        merge_documents(&mut base, json!({"theme": "dark", "sidebar": true}));
        assert_eq!(base, json!({"theme": "dark", "pageSize": 20, "sidebar": true}));
    }

    #[test]
    fn test_merge_recurses_into_objects() {
        let mut base = json!({"alerts": {"lowStock": true, "email": false}});
        merge_documents(&mut base, json!({"alerts": {"email": true}}));
        assert_eq!(base, json!({"alerts": {"lowStock": true, "email": true}}));
    }

    #[test]
    fn test_null_removes_key() {
        let mut base = json!({"theme": "dark", "legacy": 1});
        merge_documents(&mut base, json!({"legacy": null}));
        assert_eq!(base, json!({"theme": "dark"}));
    }
}
