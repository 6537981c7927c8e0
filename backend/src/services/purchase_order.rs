//! Purchase order service: CRUD, the status state machine, analytics,
//! and demo data seeding.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{PoPriority, PoStatus, PurchaseOrder, PurchaseOrderLine};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_positive_quantity;

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
}

/// Filters for listing purchase orders
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub search: Option<String>,
    pub status: Option<PoStatus>,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PurchaseOrderFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// One line of a create/update request
#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

/// Input for creating a purchase order (always starts in DRAFT)
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: Uuid,
    pub warehouse_id: Uuid,
    pub priority: Option<PoPriority>,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<OrderLineInput>,
}

/// Input for updating a purchase order. Only DRAFT orders may change.
#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseOrderInput {
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub priority: Option<PoPriority>,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Option<Vec<OrderLineInput>>,
}

/// Input for a status transition
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: PoStatus,
}

/// Aggregate figures for the purchase order dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoAnalytics {
    pub total_orders: i64,
    pub open_orders: i64,
    pub total_value: Decimal,
    pub average_value: Decimal,
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<StatusCount>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub key: String,
    pub count: i64,
    pub value: Decimal,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    po_number: String,
    supplier_id: Uuid,
    warehouse_id: Uuid,
    priority: String,
    status: String,
    total_amount: Decimal,
    expected_date: Option<NaiveDate>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_model(self, lines: Vec<PurchaseOrderLine>) -> AppResult<PurchaseOrder> {
        let priority = self
            .priority
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad priority: {}", self.priority)))?;
        let status = self
            .status
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad order status: {}", self.status)))?;
        Ok(PurchaseOrder {
            id: self.id,
            po_number: self.po_number,
            supplier_id: self.supplier_id,
            warehouse_id: self.warehouse_id,
            priority,
            status,
            lines,
            total_amount: self.total_amount,
            expected_date: self.expected_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct LineRow {
    id: Uuid,
    product_id: Uuid,
    sku: String,
    quantity: i64,
    unit_cost: Decimal,
    line_total: Decimal,
}

impl LineRow {
    fn into_model(self) -> PurchaseOrderLine {
        PurchaseOrderLine {
            id: self.id,
            product_id: self.product_id,
            sku: self.sku,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            line_total: self.line_total,
        }
    }
}

const ORDER_COLUMNS: &str = "id, po_number, supplier_id, warehouse_id, priority, status, \
                             total_amount, expected_date, notes, created_at, updated_at";

const LINE_SELECT: &str = r#"
    SELECT l.id, l.product_id, p.sku, l.quantity, l.unit_cost, l.line_total
    FROM purchase_order_lines l
    JOIN products p ON p.id = l.product_id
"#;

impl PurchaseOrderService {
    /// Create a new PurchaseOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List purchase orders with filters and pagination. Lines are loaded
    /// for the current page only.
    pub async fn list(
        &self,
        filter: PurchaseOrderFilter,
    ) -> AppResult<PaginatedResponse<PurchaseOrder>> {
        let pagination = filter.pagination();
        let search = filter.search.as_deref().map(|s| format!("%{}%", s));
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM purchase_orders
            WHERE ($1::text IS NULL OR po_number ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR supplier_id = $3)
              AND ($4::uuid IS NULL OR warehouse_id = $4)
            "#,
        )
        .bind(&search)
        .bind(status)
        .bind(filter.supplier_id)
        .bind(filter.warehouse_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM purchase_orders
            WHERE ($1::text IS NULL OR po_number ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR supplier_id = $3)
              AND ($4::uuid IS NULL OR warehouse_id = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(&search)
        .bind(status)
        .bind(filter.supplier_id)
        .bind(filter.warehouse_id)
        .bind(i64::from(pagination.per_page.max(1)))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.load_lines(row.id).await?;
            data.push(row.into_model(lines)?);
        }

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Get a purchase order with its lines
    pub async fn get(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let lines = self.load_lines(row.id).await?;
        row.into_model(lines)
    }

    /// Create a purchase order in DRAFT with its lines. The order number
    /// and total are generated server-side.
    pub async fn create(&self, input: CreatePurchaseOrderInput) -> AppResult<PurchaseOrder> {
        Self::validate_lines(&input.lines)?;

        let mut tx = self.db.begin().await?;

        let po_number = self.next_po_number(&mut tx).await?;
        let priority = input.priority.unwrap_or_default();
        let total = Self::order_total(&input.lines);

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchase_orders
                (po_number, supplier_id, warehouse_id, priority, status, total_amount,
                 expected_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&po_number)
        .bind(input.supplier_id)
        .bind(input.warehouse_id)
        .bind(priority.as_str())
        .bind(PoStatus::Draft.as_str())
        .bind(total)
        .bind(input.expected_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        self.insert_lines(&mut tx, order_id, &input.lines).await?;

        tx.commit().await?;

        self.get(order_id).await
    }

    /// Update a purchase order. Only DRAFT orders are editable; replacing
    /// the lines recomputes the total.
    pub async fn update(
        &self,
        order_id: Uuid,
        input: UpdatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        let current = self.get(order_id).await?;
        if current.status != PoStatus::Draft {
            return Err(AppError::Conflict(format!(
                "Only DRAFT orders can be edited (current status {})",
                current.status
            )));
        }

        if let Some(lines) = &input.lines {
            Self::validate_lines(lines)?;
        }

        let supplier_id = input.supplier_id.unwrap_or(current.supplier_id);
        let warehouse_id = input.warehouse_id.unwrap_or(current.warehouse_id);
        let priority = input.priority.unwrap_or(current.priority);
        let expected_date = input.expected_date.or(current.expected_date);
        let notes = input.notes.or(current.notes);
        let total = match &input.lines {
            Some(lines) => Self::order_total(lines),
            None => current.total_amount,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE purchase_orders
            SET supplier_id = $1, warehouse_id = $2, priority = $3, total_amount = $4,
                expected_date = $5, notes = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(supplier_id)
        .bind(warehouse_id)
        .bind(priority.as_str())
        .bind(total)
        .bind(expected_date)
        .bind(&notes)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if let Some(lines) = &input.lines {
            sqlx::query("DELETE FROM purchase_order_lines WHERE purchase_order_id = $1")
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
            self.insert_lines(&mut tx, order_id, lines).await?;
        }

        tx.commit().await?;

        self.get(order_id).await
    }

    /// Move the order to a new status, enforcing the lifecycle rules. The
    /// row stays locked while the transition is validated, so concurrent
    /// transitions serialize instead of both passing a stale check.
    pub async fn set_status(&self, order_id: Uuid, next: PoStatus) -> AppResult<PurchaseOrder> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM purchase_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;
        let current: PoStatus = status
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad order status: {}", status)))?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move order from {} to {}",
                current, next
            )));
        }

        sqlx::query("UPDATE purchase_orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(next.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(order_id).await
    }

    /// Delete a purchase order. Only DRAFT orders may be deleted.
    pub async fn delete(&self, order_id: Uuid) -> AppResult<()> {
        let current = self.get(order_id).await?;
        if current.status != PoStatus::Draft {
            return Err(AppError::Conflict(
                "Only DRAFT orders can be deleted".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM purchase_order_lines WHERE purchase_order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    /// Status and priority breakdowns for the order dashboard
    pub async fn analytics(&self) -> AppResult<PoAnalytics> {
        #[derive(FromRow)]
        struct BucketRow {
            key: String,
            count: i64,
            value: Decimal,
        }

        let by_status = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT status AS key, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS value
            FROM purchase_orders GROUP BY status ORDER BY status
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let by_priority = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT priority AS key, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS value
            FROM purchase_orders GROUP BY priority ORDER BY priority
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let total_orders: i64 = by_status.iter().map(|b| b.count).sum();
        let total_value: Decimal = by_status.iter().map(|b| b.value).sum();
        let open_orders: i64 = by_status
            .iter()
            .filter(|b| {
                b.key
                    .parse::<PoStatus>()
                    .map(|s| !s.is_terminal())
                    .unwrap_or(false)
            })
            .map(|b| b.count)
            .sum();
        let average_value = if total_orders > 0 {
            total_value / Decimal::from(total_orders)
        } else {
            Decimal::ZERO
        };

        let bucket = |rows: Vec<BucketRow>| {
            rows.into_iter()
                .map(|b| StatusCount {
                    key: b.key,
                    count: b.count,
                    value: b.value,
                })
                .collect()
        };

        Ok(PoAnalytics {
            total_orders,
            open_orders,
            total_value,
            average_value,
            by_status: bucket(by_status),
            by_priority: bucket(by_priority),
        })
    }

    /// Create a handful of demo orders against existing master data
    pub async fn seed(&self) -> AppResult<Vec<PurchaseOrder>> {
        let supplier_ids =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM suppliers ORDER BY code LIMIT 3")
                .fetch_all(&self.db)
                .await?;
        let warehouse_ids =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM warehouses ORDER BY code LIMIT 3")
                .fetch_all(&self.db)
                .await?;
        let products = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT id, cost_price FROM products ORDER BY sku LIMIT 5",
        )
        .fetch_all(&self.db)
        .await?;

        if supplier_ids.is_empty() || warehouse_ids.is_empty() || products.is_empty() {
            return Err(AppError::ValidationError(
                "Seeding requires at least one supplier, warehouse, and product".to_string(),
            ));
        }

        let priorities = [PoPriority::Normal, PoPriority::High, PoPriority::Urgent];
        let mut created = Vec::new();
        for (n, priority) in priorities.iter().enumerate() {
            let lines: Vec<OrderLineInput> = products
                .iter()
                .take(n + 1)
                .map(|(product_id, cost)| OrderLineInput {
                    product_id: *product_id,
                    quantity: (10 * (n as i64 + 1)),
                    unit_cost: *cost,
                })
                .collect();
            let order = self
                .create(CreatePurchaseOrderInput {
                    supplier_id: supplier_ids[n % supplier_ids.len()],
                    warehouse_id: warehouse_ids[n % warehouse_ids.len()],
                    priority: Some(*priority),
                    expected_date: None,
                    notes: Some("Seeded demo order".to_string()),
                    lines,
                })
                .await?;
            created.push(order);
        }

        Ok(created)
    }

    async fn load_lines(&self, order_id: Uuid) -> AppResult<Vec<PurchaseOrderLine>> {
        let rows = sqlx::query_as::<_, LineRow>(&format!(
            "{LINE_SELECT} WHERE l.purchase_order_id = $1 ORDER BY p.sku"
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(LineRow::into_model).collect())
    }

    async fn insert_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        lines: &[OrderLineInput],
    ) -> AppResult<()> {
        for line in lines {
            let line_total = PurchaseOrderLine::compute_total(line.quantity, line.unit_cost);
            sqlx::query(
                r#"
                INSERT INTO purchase_order_lines
                    (purchase_order_id, product_id, quantity, unit_cost, line_total)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_cost)
            .bind(line_total)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Numbers are sequential within a calendar year, e.g. "PO-2026-00017".
    /// The counter lives in the database so concurrent creates never hand
    /// out the same number.
    async fn next_po_number(&self, tx: &mut Transaction<'_, Postgres>) -> AppResult<String> {
        let year = Utc::now().year();
        let sequence: i64 = sqlx::query_scalar("SELECT get_next_document_number($1, $2)")
            .bind("PO")
            .bind(year)
            .fetch_one(&mut **tx)
            .await?;

        Ok(format_po_number(year, sequence))
    }

    fn validate_lines(lines: &[OrderLineInput]) -> AppResult<()> {
        if lines.is_empty() {
            return Err(AppError::ValidationError(
                "A purchase order needs at least one line".to_string(),
            ));
        }
        for line in lines {
            validate_positive_quantity(line.quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            })?;
            if line.unit_cost < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "unitCost".to_string(),
                    message: "Unit cost cannot be negative".to_string(),
                });
            }
        }
        Ok(())
    }

    fn order_total(lines: &[OrderLineInput]) -> Decimal {
        lines
            .iter()
            .map(|l| PurchaseOrderLine::compute_total(l.quantity, l.unit_cost))
            .sum()
    }
}

fn format_po_number(year: i32, sequence: i64) -> String {
    format!("PO-{}-{:05}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_po_number_format() {
        assert_eq!(format_po_number(2026, 17), "PO-2026-00017");
        assert_eq!(format_po_number(2026, 1), "PO-2026-00001");
    }

    #[test]
    fn test_po_number_widens_past_five_digits() {
        assert_eq!(format_po_number(2026, 123_456), "PO-2026-123456");
    }
}
