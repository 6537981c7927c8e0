//! Product master data service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Product, ProductStatus};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_sku;

/// Product service for master data CRUD
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Filters for listing products
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
    pub min_stock_level: Option<i32>,
}

/// Input for updating a product (all fields optional)
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub min_stock_level: Option<i32>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    description: Option<String>,
    unit_price: Decimal,
    cost_price: Decimal,
    min_stock_level: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_model(self) -> AppResult<Product> {
        let status = self
            .status
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad product status: {}", self.status)))?;
        Ok(Product {
            id: self.id,
            sku: self.sku,
            name: self.name,
            description: self.description,
            unit_price: self.unit_price,
            cost_price: self.cost_price,
            min_stock_level: self.min_stock_level,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, sku, name, description, unit_price, cost_price, \
                               min_stock_level, status, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products with optional search/status filters and pagination
    pub async fn list(&self, filter: ProductFilter) -> AppResult<PaginatedResponse<Product>> {
        let pagination = filter.pagination();
        let search = filter.search.as_deref().map(|s| format!("%{}%", s));
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(&search)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY sku
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
            .map(ProductRow::into_model)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Get a product by id
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        row.into_model()
    }

    /// Create a product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_sku(&input.sku).map_err(|msg| AppError::Validation {
            field: "sku".to_string(),
            message: msg.to_string(),
        })?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        if input.unit_price < Decimal::ZERO || input.cost_price < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Prices cannot be negative".to_string(),
            ));
        }

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE sku = $1")
            .bind(&input.sku)
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (sku, name, description, unit_price, cost_price, min_stock_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.unit_price)
        .bind(input.cost_price)
        .bind(input.min_stock_level.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Update a product
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let current = self.get(product_id).await?;

        let unit_price = input.unit_price.unwrap_or(current.unit_price);
        let cost_price = input.cost_price.unwrap_or(current.cost_price);
        if unit_price < Decimal::ZERO || cost_price < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Prices cannot be negative".to_string(),
            ));
        }

        let name = input.name.unwrap_or(current.name);
        let description = input.description.or(current.description);
        let min_stock_level = input.min_stock_level.unwrap_or(current.min_stock_level);
        let status = input.status.unwrap_or(current.status);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $1, description = $2, unit_price = $3, cost_price = $4,
                min_stock_level = $5, status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(&description)
        .bind(unit_price)
        .bind(cost_price)
        .bind(min_stock_level)
        .bind(status.as_str())
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Delete a product. Fails if inventory or order lines reference it.
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM inventory WHERE product_id = $1)
                 + (SELECT COUNT(*) FROM purchase_order_lines WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;
        if referenced > 0 {
            return Err(AppError::Conflict(
                "Product is referenced by inventory or orders and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}
