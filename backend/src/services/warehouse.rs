//! Warehouse master data service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Warehouse, WarehouseType};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_entity_code;

/// Warehouse service for master data CRUD
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Filters for listing warehouses
#[derive(Debug, Default, Deserialize)]
pub struct WarehouseFilter {
    pub search: Option<String>,
    pub warehouse_type: Option<WarehouseType>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl WarehouseFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub code: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub warehouse_type: Option<WarehouseType>,
}

/// Input for updating a warehouse (all fields optional)
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub warehouse_type: Option<WarehouseType>,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    code: String,
    name: String,
    city: Option<String>,
    country: Option<String>,
    warehouse_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WarehouseRow {
    fn into_model(self) -> AppResult<Warehouse> {
        let warehouse_type = self.warehouse_type.parse().map_err(|_| {
            AppError::Internal(format!("Bad warehouse type: {}", self.warehouse_type))
        })?;
        Ok(Warehouse {
            id: self.id,
            code: self.code,
            name: self.name,
            city: self.city,
            country: self.country,
            warehouse_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const WAREHOUSE_COLUMNS: &str =
    "id, code, name, city, country, warehouse_type, created_at, updated_at";

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List warehouses with optional search/type filters and pagination
    pub async fn list(&self, filter: WarehouseFilter) -> AppResult<PaginatedResponse<Warehouse>> {
        let pagination = filter.pagination();
        let search = filter.search.as_deref().map(|s| format!("%{}%", s));
        let warehouse_type = filter.warehouse_type.map(|t| t.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM warehouses
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1 OR city ILIKE $1)
              AND ($2::text IS NULL OR warehouse_type = $2)
            "#,
        )
        .bind(&search)
        .bind(warehouse_type)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, WarehouseRow>(&format!(
            r#"
            SELECT {WAREHOUSE_COLUMNS} FROM warehouses
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1 OR city ILIKE $1)
              AND ($2::text IS NULL OR warehouse_type = $2)
            ORDER BY code
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&search)
        .bind(warehouse_type)
        .bind(i64::from(pagination.per_page.max(1)))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(WarehouseRow::into_model)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Get a warehouse by id
    pub async fn get(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1"
        ))
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        row.into_model()
    }

    /// Create a warehouse
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        validate_entity_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE code = $1")
                .bind(&input.code)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let warehouse_type = input.warehouse_type.unwrap_or_default();

        let row = sqlx::query_as::<_, WarehouseRow>(&format!(
            r#"
            INSERT INTO warehouses (code, name, city, country, warehouse_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.country)
        .bind(warehouse_type.as_str())
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Update a warehouse
    pub async fn update(
        &self,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let current = self.get(warehouse_id).await?;

        let name = input.name.unwrap_or(current.name);
        let city = input.city.or(current.city);
        let country = input.country.or(current.country);
        let warehouse_type = input.warehouse_type.unwrap_or(current.warehouse_type);

        let row = sqlx::query_as::<_, WarehouseRow>(&format!(
            r#"
            UPDATE warehouses
            SET name = $1, city = $2, country = $3, warehouse_type = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(&city)
        .bind(&country)
        .bind(warehouse_type.as_str())
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Delete a warehouse. Fails if inventory is held there.
    pub async fn delete(&self, warehouse_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory WHERE warehouse_id = $1",
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;
        if referenced > 0 {
            return Err(AppError::Conflict(
                "Warehouse holds inventory and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }
}
