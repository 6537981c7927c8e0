//! Inventory items and movement audit records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stock position for one product in one warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(alias = "INVENTORY_ID", alias = "inventory_id")]
    pub inventory_id: Uuid,
    #[serde(alias = "PRODUCT_ID", alias = "product_id")]
    pub product_id: Uuid,
    #[serde(alias = "WAREHOUSE_ID", alias = "warehouse_id")]
    pub warehouse_id: Uuid,
    #[serde(alias = "SKU")]
    pub sku: String,
    #[serde(alias = "PRODUCT_NAME", alias = "product_name")]
    pub product_name: String,
    #[serde(alias = "WAREHOUSE_NAME", alias = "warehouse_name")]
    pub warehouse_name: String,
    #[serde(alias = "QTY_ON_HAND", alias = "qty_on_hand")]
    pub qty_on_hand: i64,
    #[serde(alias = "QTY_RESERVED", alias = "qty_reserved")]
    pub qty_reserved: i64,
    /// Derived: on hand minus reserved
    #[serde(alias = "QTY_AVAILABLE", alias = "qty_available")]
    pub qty_available: i64,
    #[serde(alias = "REORDER_POINT", alias = "reorder_point")]
    pub reorder_point: i64,
    #[serde(alias = "UNIT_PRICE", alias = "unit_price")]
    pub unit_price: Decimal,
    #[serde(alias = "STATUS")]
    pub status: StockStatus,
}

/// Stock health relative to the reorder point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Ok,
    Low,
    Critical,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Ok => "OK",
            StockStatus::Low => "LOW",
            StockStatus::Critical => "CRITICAL",
        }
    }
}

/// Classify a stock position against its reorder point.
///
/// CRITICAL when nothing is available or availability has fallen to half
/// the reorder point; LOW when at or below the reorder point; OK above it.
pub fn classify_stock(qty_available: i64, reorder_point: i64) -> StockStatus {
    if qty_available <= 0 || (reorder_point > 0 && qty_available * 2 <= reorder_point) {
        StockStatus::Critical
    } else if qty_available <= reorder_point {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// Kinds of inventory movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Adjustment,
    Reserve,
    Release,
    TransferIn,
    TransferOut,
    ReorderLevel,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Adjustment => "ADJUSTMENT",
            MovementType::Reserve => "RESERVE",
            MovementType::Release => "RELEASE",
            MovementType::TransferIn => "TRANSFER_IN",
            MovementType::TransferOut => "TRANSFER_OUT",
            MovementType::ReorderLevel => "REORDER_LEVEL",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADJUSTMENT" => Ok(MovementType::Adjustment),
            "RESERVE" => Ok(MovementType::Reserve),
            "RELEASE" => Ok(MovementType::Release),
            "TRANSFER_IN" => Ok(MovementType::TransferIn),
            "TRANSFER_OUT" => Ok(MovementType::TransferOut),
            "REORDER_LEVEL" => Ok(MovementType::ReorderLevel),
            _ => Err("Unknown movement type"),
        }
    }
}

/// Audit record of a quantity change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMovement {
    #[serde(alias = "MOVEMENT_ID", alias = "movement_id")]
    pub id: Uuid,
    #[serde(alias = "PRODUCT_ID", alias = "product_id")]
    pub product_id: Uuid,
    #[serde(alias = "WAREHOUSE_ID", alias = "warehouse_id")]
    pub warehouse_id: Uuid,
    #[serde(alias = "MOVEMENT_TYPE", alias = "movement_type", alias = "type")]
    pub movement_type: MovementType,
    #[serde(alias = "QTY_CHANGE", alias = "qty_change")]
    pub qty_change: i64,
    #[serde(alias = "PREVIOUS_QTY", alias = "previous_qty")]
    pub previous_qty: i64,
    #[serde(alias = "NEW_QTY", alias = "new_qty")]
    pub new_qty: i64,
    #[serde(alias = "REASON")]
    pub reason: Option<String>,
    #[serde(alias = "NOTE")]
    pub note: Option<String>,
    /// Free-form reference (order number, ticket id)
    #[serde(alias = "REFERENCE")]
    pub reference: Option<String>,
    #[serde(alias = "CREATED_BY", alias = "created_by")]
    pub created_by: Option<Uuid>,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ok_above_reorder_point() {
        assert_eq!(classify_stock(100, 20), StockStatus::Ok);
        assert_eq!(classify_stock(21, 20), StockStatus::Ok);
    }

    #[test]
    fn test_classify_low_at_or_below_reorder_point() {
        assert_eq!(classify_stock(20, 20), StockStatus::Low);
        assert_eq!(classify_stock(11, 20), StockStatus::Low);
    }

    #[test]
    fn test_classify_critical_at_half_reorder_point() {
        assert_eq!(classify_stock(10, 20), StockStatus::Critical);
        assert_eq!(classify_stock(1, 20), StockStatus::Critical);
    }

    #[test]
    fn test_classify_critical_when_nothing_available() {
        assert_eq!(classify_stock(0, 0), StockStatus::Critical);
        assert_eq!(classify_stock(-5, 20), StockStatus::Critical);
    }

    #[test]
    fn test_classify_no_reorder_point_only_zero_is_critical() {
        assert_eq!(classify_stock(1, 0), StockStatus::Ok);
        assert_eq!(classify_stock(0, 0), StockStatus::Critical);
    }
}
