//! Inventory service: stock positions, adjust/reserve/release/transfer
//! operations, and the movement audit trail.
//!
//! Every mutation runs in a transaction and locks the affected inventory
//! rows with `SELECT ... FOR UPDATE`, so concurrent operations on the same
//! position serialize instead of losing updates. Each mutation writes
//! exactly one movement record (a transfer writes a debit/credit pair).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{classify_stock, InventoryItem, InventoryMovement, MovementType, StockStatus};
use shared::validation::validate_positive_quantity;

/// Inventory service for stock operations
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Filters for the inventory list view
#[derive(Debug, Default, Deserialize)]
pub struct InventoryFilter {
    pub warehouse_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub search: Option<String>,
    pub status: Option<StockStatus>,
}

/// Input for a manual stock adjustment (positive or negative)
#[derive(Debug, Deserialize)]
pub struct AdjustInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub qty_change: i64,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub reference: Option<String>,
}

/// Input for reserving or releasing stock
#[derive(Debug, Deserialize)]
pub struct ReserveInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i64,
    pub reference: Option<String>,
}

/// Input for transferring stock between warehouses
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub product_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub quantity: i64,
    pub note: Option<String>,
    pub reference: Option<String>,
}

/// Input for setting the reorder point of a position
#[derive(Debug, Deserialize)]
pub struct ReorderLevelInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub reorder_point: i64,
}

/// Per-warehouse inventory summary
#[derive(Debug, Serialize)]
pub struct InventorySummary {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub item_count: i64,
    pub total_on_hand: i64,
    pub total_reserved: i64,
    pub total_value: Decimal,
    pub low_count: i64,
    pub critical_count: i64,
}

/// Locked stock position row
#[derive(Debug, FromRow)]
struct PositionRow {
    id: Uuid,
    qty_on_hand: i64,
    qty_reserved: i64,
    reorder_point: i64,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    inventory_id: Uuid,
    product_id: Uuid,
    warehouse_id: Uuid,
    sku: String,
    product_name: String,
    warehouse_name: String,
    qty_on_hand: i64,
    qty_reserved: i64,
    reorder_point: i64,
    unit_price: Decimal,
}

impl ItemRow {
    fn into_model(self) -> InventoryItem {
        let qty_available = self.qty_on_hand - self.qty_reserved;
        let status = classify_stock(qty_available, self.reorder_point);
        InventoryItem {
            inventory_id: self.inventory_id,
            product_id: self.product_id,
            warehouse_id: self.warehouse_id,
            sku: self.sku,
            product_name: self.product_name,
            warehouse_name: self.warehouse_name,
            qty_on_hand: self.qty_on_hand,
            qty_reserved: self.qty_reserved,
            qty_available,
            reorder_point: self.reorder_point,
            unit_price: self.unit_price,
            status,
        }
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    warehouse_id: Uuid,
    movement_type: String,
    qty_change: i64,
    previous_qty: i64,
    new_qty: i64,
    reason: Option<String>,
    note: Option<String>,
    reference: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_model(self) -> AppResult<InventoryMovement> {
        let movement_type = self.movement_type.parse().map_err(|_| {
            AppError::Internal(format!("Bad movement type: {}", self.movement_type))
        })?;
        Ok(InventoryMovement {
            id: self.id,
            product_id: self.product_id,
            warehouse_id: self.warehouse_id,
            movement_type,
            qty_change: self.qty_change,
            previous_qty: self.previous_qty,
            new_qty: self.new_qty,
            reason: self.reason,
            note: self.note,
            reference: self.reference,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

const ITEM_SELECT: &str = r#"
    SELECT i.id AS inventory_id, i.product_id, i.warehouse_id,
           p.sku, p.name AS product_name, w.name AS warehouse_name,
           i.qty_on_hand, i.qty_reserved, i.reorder_point, p.unit_price
    FROM inventory i
    JOIN products p ON p.id = i.product_id
    JOIN warehouses w ON w.id = i.warehouse_id
"#;

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stock positions as a joined view, filterable by warehouse,
    /// product, text search, and stock status
    pub async fn list(&self, filter: InventoryFilter) -> AppResult<Vec<InventoryItem>> {
        let search = filter.search.as_deref().map(|s| format!("%{}%", s));

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            {ITEM_SELECT}
            WHERE ($1::uuid IS NULL OR i.warehouse_id = $1)
              AND ($2::uuid IS NULL OR i.product_id = $2)
              AND ($3::text IS NULL OR p.sku ILIKE $3 OR p.name ILIKE $3 OR w.name ILIKE $3)
            ORDER BY p.sku, w.name
            "#
        ))
        .bind(filter.warehouse_id)
        .bind(filter.product_id)
        .bind(&search)
        .fetch_all(&self.db)
        .await?;

        let mut items: Vec<InventoryItem> = rows.into_iter().map(ItemRow::into_model).collect();

        // Stock status is derived, so the status filter applies after the join
        if let Some(status) = filter.status {
            items.retain(|item| item.status == status);
        }

        Ok(items)
    }

    /// Get one stock position
    pub async fn get(&self, product_id: Uuid, warehouse_id: Uuid) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "{ITEM_SELECT} WHERE i.product_id = $1 AND i.warehouse_id = $2"
        ))
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        Ok(row.into_model())
    }

    /// Per-warehouse totals plus low/critical counts
    pub async fn summary(&self) -> AppResult<Vec<InventorySummary>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!("{ITEM_SELECT} ORDER BY w.name, p.sku"))
            .fetch_all(&self.db)
            .await?;

        let mut summaries: Vec<InventorySummary> = Vec::new();
        for row in rows {
            let item = row.into_model();
            let summary = match summaries
                .iter_mut()
                .find(|s| s.warehouse_id == item.warehouse_id)
            {
                Some(existing) => existing,
                None => {
                    summaries.push(InventorySummary {
                        warehouse_id: item.warehouse_id,
                        warehouse_name: item.warehouse_name.clone(),
                        item_count: 0,
                        total_on_hand: 0,
                        total_reserved: 0,
                        total_value: Decimal::ZERO,
                        low_count: 0,
                        critical_count: 0,
                    });
                    summaries.last_mut().expect("just pushed")
                }
            };
            summary.item_count += 1;
            summary.total_on_hand += item.qty_on_hand;
            summary.total_reserved += item.qty_reserved;
            summary.total_value += Decimal::from(item.qty_on_hand) * item.unit_price;
            match item.status {
                StockStatus::Low => summary.low_count += 1,
                StockStatus::Critical => summary.critical_count += 1,
                StockStatus::Ok => {}
            }
        }

        Ok(summaries)
    }

    /// Manually adjust on-hand stock. A positive change on a missing
    /// position creates it; the result may never drop below the reserved
    /// quantity.
    pub async fn adjust(&self, user_id: Uuid, input: AdjustInput) -> AppResult<InventoryItem> {
        if input.qty_change == 0 {
            return Err(AppError::ValidationError(
                "Adjustment quantity cannot be zero".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let position = self
            .lock_position(&mut tx, input.product_id, input.warehouse_id)
            .await?;

        let position = match position {
            Some(p) => p,
            None if input.qty_change > 0 => {
                self.ensure_references(&mut tx, input.product_id, input.warehouse_id)
                    .await?;
                self.insert_position(&mut tx, input.product_id, input.warehouse_id)
                    .await?
            }
            None => return Err(AppError::NotFound("Inventory item".to_string())),
        };

        let new_on_hand = position.qty_on_hand + input.qty_change;
        if new_on_hand < position.qty_reserved {
            return Err(AppError::InsufficientStock(format!(
                "Adjustment would drop on-hand below reserved ({} reserved)",
                position.qty_reserved
            )));
        }

        sqlx::query("UPDATE inventory SET qty_on_hand = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_on_hand)
            .bind(position.id)
            .execute(&mut *tx)
            .await?;

        self.record_movement(
            &mut tx,
            &input.product_id,
            &input.warehouse_id,
            MovementType::Adjustment,
            input.qty_change,
            position.qty_on_hand,
            new_on_hand,
            input.reason.as_deref(),
            input.note.as_deref(),
            input.reference.as_deref(),
            user_id,
        )
        .await?;

        tx.commit().await?;

        self.get(input.product_id, input.warehouse_id).await
    }

    /// Reserve available stock for an order
    pub async fn reserve(&self, user_id: Uuid, input: ReserveInput) -> AppResult<InventoryItem> {
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let position = self
            .lock_position(&mut tx, input.product_id, input.warehouse_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let available = position.qty_on_hand - position.qty_reserved;
        if input.quantity > available {
            return Err(AppError::InsufficientStock(format!(
                "Requested {} but only {} available",
                input.quantity, available
            )));
        }

        let new_reserved = position.qty_reserved + input.quantity;
        sqlx::query("UPDATE inventory SET qty_reserved = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_reserved)
            .bind(position.id)
            .execute(&mut *tx)
            .await?;

        self.record_movement(
            &mut tx,
            &input.product_id,
            &input.warehouse_id,
            MovementType::Reserve,
            input.quantity,
            position.qty_reserved,
            new_reserved,
            None,
            None,
            input.reference.as_deref(),
            user_id,
        )
        .await?;

        tx.commit().await?;

        self.get(input.product_id, input.warehouse_id).await
    }

    /// Release previously reserved stock
    pub async fn release(&self, user_id: Uuid, input: ReserveInput) -> AppResult<InventoryItem> {
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let position = self
            .lock_position(&mut tx, input.product_id, input.warehouse_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        if input.quantity > position.qty_reserved {
            return Err(AppError::InsufficientStock(format!(
                "Cannot release {} with only {} reserved",
                input.quantity, position.qty_reserved
            )));
        }

        let new_reserved = position.qty_reserved - input.quantity;
        sqlx::query("UPDATE inventory SET qty_reserved = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_reserved)
            .bind(position.id)
            .execute(&mut *tx)
            .await?;

        self.record_movement(
            &mut tx,
            &input.product_id,
            &input.warehouse_id,
            MovementType::Release,
            -input.quantity,
            position.qty_reserved,
            new_reserved,
            None,
            None,
            input.reference.as_deref(),
            user_id,
        )
        .await?;

        tx.commit().await?;

        self.get(input.product_id, input.warehouse_id).await
    }

    /// Move available stock between two warehouses atomically. Writes a
    /// TRANSFER_OUT movement at the source and a TRANSFER_IN at the
    /// destination.
    pub async fn transfer(&self, user_id: Uuid, input: TransferInput) -> AppResult<()> {
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        if input.from_warehouse_id == input.to_warehouse_id {
            return Err(AppError::ValidationError(
                "Source and destination warehouses must differ".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        // Lock in a fixed order to avoid deadlock between opposite transfers
        let (first, second) = if input.from_warehouse_id < input.to_warehouse_id {
            (input.from_warehouse_id, input.to_warehouse_id)
        } else {
            (input.to_warehouse_id, input.from_warehouse_id)
        };
        let first_pos = self.lock_position(&mut tx, input.product_id, first).await?;
        let second_pos = self.lock_position(&mut tx, input.product_id, second).await?;
        let (source, dest) = if first == input.from_warehouse_id {
            (first_pos, second_pos)
        } else {
            (second_pos, first_pos)
        };

        let source = source.ok_or_else(|| AppError::NotFound("Source inventory".to_string()))?;
        let available = source.qty_on_hand - source.qty_reserved;
        if input.quantity > available {
            return Err(AppError::InsufficientStock(format!(
                "Requested {} but only {} available at source",
                input.quantity, available
            )));
        }

        let dest = match dest {
            Some(d) => d,
            None => {
                self.ensure_references(&mut tx, input.product_id, input.to_warehouse_id)
                    .await?;
                self.insert_position(&mut tx, input.product_id, input.to_warehouse_id)
                    .await?
            }
        };

        let source_new = source.qty_on_hand - input.quantity;
        let dest_new = dest.qty_on_hand + input.quantity;

        sqlx::query("UPDATE inventory SET qty_on_hand = $1, updated_at = NOW() WHERE id = $2")
            .bind(source_new)
            .bind(source.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE inventory SET qty_on_hand = $1, updated_at = NOW() WHERE id = $2")
            .bind(dest_new)
            .bind(dest.id)
            .execute(&mut *tx)
            .await?;

        self.record_movement(
            &mut tx,
            &input.product_id,
            &input.from_warehouse_id,
            MovementType::TransferOut,
            -input.quantity,
            source.qty_on_hand,
            source_new,
            None,
            input.note.as_deref(),
            input.reference.as_deref(),
            user_id,
        )
        .await?;
        self.record_movement(
            &mut tx,
            &input.product_id,
            &input.to_warehouse_id,
            MovementType::TransferIn,
            input.quantity,
            dest.qty_on_hand,
            dest_new,
            None,
            input.note.as_deref(),
            input.reference.as_deref(),
            user_id,
        )
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Set the reorder point for a position
    pub async fn set_reorder_level(
        &self,
        user_id: Uuid,
        input: ReorderLevelInput,
    ) -> AppResult<InventoryItem> {
        if input.reorder_point < 0 {
            return Err(AppError::ValidationError(
                "Reorder point cannot be negative".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let position = self
            .lock_position(&mut tx, input.product_id, input.warehouse_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        sqlx::query("UPDATE inventory SET reorder_point = $1, updated_at = NOW() WHERE id = $2")
            .bind(input.reorder_point)
            .bind(position.id)
            .execute(&mut *tx)
            .await?;

        self.record_movement(
            &mut tx,
            &input.product_id,
            &input.warehouse_id,
            MovementType::ReorderLevel,
            0,
            position.reorder_point,
            input.reorder_point,
            None,
            None,
            None,
            user_id,
        )
        .await?;

        tx.commit().await?;

        self.get(input.product_id, input.warehouse_id).await
    }

    /// Movement audit trail for one position, newest first
    pub async fn history(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Vec<InventoryMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, warehouse_id, movement_type, qty_change, previous_qty,
                   new_qty, reason, note, reference, created_by, created_at
            FROM inventory_movements
            WHERE product_id = $1 AND warehouse_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(MovementRow::into_model).collect()
    }

    async fn lock_position(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Option<PositionRow>> {
        let row = sqlx::query_as::<_, PositionRow>(
            r#"
            SELECT id, qty_on_hand, qty_reserved, reorder_point
            FROM inventory
            WHERE product_id = $1 AND warehouse_id = $2
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row)
    }

    async fn insert_position(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<PositionRow> {
        let row = sqlx::query_as::<_, PositionRow>(
            r#"
            INSERT INTO inventory (product_id, warehouse_id, qty_on_hand, qty_reserved, reorder_point)
            VALUES ($1, $2, 0, 0, 0)
            RETURNING id, qty_on_hand, qty_reserved, reorder_point
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    /// Validate the product and warehouse exist before creating a position
    async fn ensure_references(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<()> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&mut **tx)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(warehouse_id)
                .fetch_one(&mut **tx)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_movement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: &Uuid,
        warehouse_id: &Uuid,
        movement_type: MovementType,
        qty_change: i64,
        previous_qty: i64,
        new_qty: i64,
        reason: Option<&str>,
        note: Option<&str>,
        reference: Option<&str>,
        user_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_movements
                (product_id, warehouse_id, movement_type, qty_change, previous_qty, new_qty,
                 reason, note, reference, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(movement_type.as_str())
        .bind(qty_change)
        .bind(previous_qty)
        .bind(new_qty)
        .bind(reason)
        .bind(note)
        .bind(reference)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
