//! Cross-entity analytics: the dashboard snapshot and CSV export.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::services::inventory::InventoryFilter;
use crate::services::InventoryService;
use shared::models::StockStatus;

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// One-shot snapshot backing the dashboard page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub supplier_count: i64,
    pub product_count: i64,
    pub warehouse_count: i64,
    pub open_purchase_orders: i64,
    pub shipments_in_transit: i64,
    pub inventory_positions: i64,
    pub total_stock_value: Decimal,
    pub low_stock_count: i64,
    pub critical_stock_count: i64,
}

#[derive(Debug, FromRow)]
struct CountsRow {
    supplier_count: i64,
    product_count: i64,
    warehouse_count: i64,
    open_purchase_orders: i64,
    shipments_in_transit: i64,
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Entity counts plus derived inventory health figures
    pub async fn dashboard(&self) -> AppResult<DashboardSnapshot> {
        let counts = sqlx::query_as::<_, CountsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM suppliers) AS supplier_count,
                (SELECT COUNT(*) FROM products) AS product_count,
                (SELECT COUNT(*) FROM warehouses) AS warehouse_count,
                (SELECT COUNT(*) FROM purchase_orders
                  WHERE status NOT IN ('RECEIVED', 'CANCELLED', 'REJECTED')) AS open_purchase_orders,
                (SELECT COUNT(*) FROM shipments
                  WHERE status IN ('IN_TRANSIT', 'DELAYED')) AS shipments_in_transit
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        // Stock status is derived in code, so health figures come from the
        // same joined view the inventory page uses
        let items = InventoryService::new(self.db.clone())
            .list(InventoryFilter::default())
            .await?;

        let mut total_stock_value = Decimal::ZERO;
        let mut low_stock_count = 0;
        let mut critical_stock_count = 0;
        for item in &items {
            total_stock_value += Decimal::from(item.qty_on_hand) * item.unit_price;
            match item.status {
                StockStatus::Low => low_stock_count += 1,
                StockStatus::Critical => critical_stock_count += 1,
                StockStatus::Ok => {}
            }
        }

        Ok(DashboardSnapshot {
            supplier_count: counts.supplier_count,
            product_count: counts.product_count,
            warehouse_count: counts.warehouse_count,
            open_purchase_orders: counts.open_purchase_orders,
            shipments_in_transit: counts.shipments_in_transit,
            inventory_positions: items.len() as i64,
            total_stock_value,
            low_stock_count,
            critical_stock_count,
        })
    }

    /// Export all inventory positions as CSV
    pub async fn export_inventory_csv(&self) -> AppResult<String> {
        #[derive(Serialize)]
        struct ExportRow<'a> {
            sku: &'a str,
            product: &'a str,
            warehouse: &'a str,
            on_hand: i64,
            reserved: i64,
            available: i64,
            reorder_point: i64,
            unit_price: Decimal,
            status: &'a str,
        }

        let items = InventoryService::new(self.db.clone())
            .list(InventoryFilter::default())
            .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for item in &items {
            writer
                .serialize(ExportRow {
                    sku: &item.sku,
                    product: &item.product_name,
                    warehouse: &item.warehouse_name,
                    on_hand: item.qty_on_hand,
                    reserved: item.qty_reserved,
                    available: item.qty_available,
                    reorder_point: item.reorder_point,
                    unit_price: item.unit_price,
                    status: item.status.as_str(),
                })
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV was not valid UTF-8: {}", e)))
    }
}
