//! Supplier master data service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Supplier, SupplierStatus};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_email, validate_entity_code};

/// Supplier service for master data CRUD
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Filters for listing suppliers
#[derive(Debug, Default, Deserialize)]
pub struct SupplierFilter {
    pub search: Option<String>,
    pub status: Option<SupplierStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SupplierFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
pub struct CreateSupplierInput {
    pub code: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Input for updating a supplier (all fields optional)
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: Option<SupplierStatus>,
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    code: String,
    name: String,
    contact_person: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    country: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SupplierRow {
    fn into_model(self) -> AppResult<Supplier> {
        let status = self
            .status
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad supplier status: {}", self.status)))?;
        Ok(Supplier {
            id: self.id,
            code: self.code,
            name: self.name,
            contact_person: self.contact_person,
            email: self.email,
            phone: self.phone,
            city: self.city,
            country: self.country,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SUPPLIER_COLUMNS: &str = "id, code, name, contact_person, email, phone, city, country, \
                                status, created_at, updated_at";

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers with optional search/status filters and pagination
    pub async fn list(&self, filter: SupplierFilter) -> AppResult<PaginatedResponse<Supplier>> {
        let pagination = filter.pagination();
        let search = filter.search.as_deref().map(|s| format!("%{}%", s));
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM suppliers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1 OR city ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(&search)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS} FROM suppliers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1 OR city ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY name
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&search)
        .bind(status)
        .bind(i64::from(pagination.per_page.max(1)))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(SupplierRow::into_model)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Get a supplier by id
    pub async fn get(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1"
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        row.into_model()
    }

    /// Create a supplier
    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
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
        if let Some(email) = &input.email {
            validate_email(email).map_err(|msg| AppError::Validation {
                field: "email".to_string(),
                message: msg.to_string(),
            })?;
        }

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers WHERE code = $1")
            .bind(&input.code)
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            INSERT INTO suppliers (code, name, contact_person, email, phone, city, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.city)
        .bind(&input.country)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Update a supplier
    pub async fn update(&self, supplier_id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        let current = self.get(supplier_id).await?;

        if let Some(email) = &input.email {
            validate_email(email).map_err(|msg| AppError::Validation {
                field: "email".to_string(),
                message: msg.to_string(),
            })?;
        }

        let name = input.name.unwrap_or(current.name);
        let contact_person = input.contact_person.or(current.contact_person);
        let email = input.email.or(current.email);
        let phone = input.phone.or(current.phone);
        let city = input.city.or(current.city);
        let country = input.country.or(current.country);
        let status = input.status.unwrap_or(current.status);

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, email = $3, phone = $4, city = $5,
                country = $6, status = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(&contact_person)
        .bind(&email)
        .bind(&phone)
        .bind(&city)
        .bind(&country)
        .bind(status.as_str())
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Delete a supplier. Fails if purchase orders reference it.
    pub async fn delete(&self, supplier_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchase_orders WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;
        if referenced > 0 {
            return Err(AppError::Conflict(
                "Supplier has purchase orders and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}
