//! Typed wrappers over the REST endpoints.
//!
//! Thin methods over [`ApiClient`]: each builds a path, delegates to the
//! generic verbs, and decodes into the shared domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ClientResult;
use shared::models::{
    InventoryItem, InventoryMovement, PoPriority, PoStatus, Product, PurchaseOrder, Shipment,
    ShipmentMode, ShipmentStatus, Supplier, User, UserPreferences, Warehouse,
};
use shared::types::PaginatedResponse;

/// Common list query parameters
#[derive(Debug, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl ListQuery {
    /// Form-encoded query string, so reserved characters in search terms
    /// survive the round trip
    fn to_query_string(&self) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(encoded) if !encoded.is_empty() => format!("?{}", encoded),
            _ => String::new(),
        }
    }
}

/// Supplier create/update payload
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Product create/update payload
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Warehouse create/update payload
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehousePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_type: Option<String>,
}

/// One purchase order line in a create/update payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

/// Purchase order create/update payload
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PoPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<OrderLinePayload>>,
}

/// Shipment create/update payload
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ShipmentMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
}

/// Shipment status transition payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentStatusPayload {
    pub status: ShipmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Inventory adjustment payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPayload {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub qty_change: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Reserve/release payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservePayload {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Transfer payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub product_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Reorder level payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLevelPayload {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub reorder_point: i64,
}

/// Registration payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Password change payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

impl ApiClient {
    // Auth

    pub async fn register(&self, payload: &RegisterPayload) -> ClientResult<Value> {
        self.post("/api/auth/register", payload).await
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<Value> {
        #[derive(Serialize)]
        struct ForgotPasswordPayload<'a> {
            email: &'a str,
        }
        self.post("/api/auth/forgot-password", &ForgotPasswordPayload { email })
            .await
    }

    // Suppliers

    pub async fn list_suppliers(
        &self,
        query: &ListQuery,
    ) -> ClientResult<PaginatedResponse<Supplier>> {
        self.get(&format!("/api/suppliers{}", query.to_query_string()))
            .await
    }

    pub async fn get_supplier(&self, id: Uuid) -> ClientResult<Supplier> {
        self.get(&format!("/api/suppliers/{}", id)).await
    }

    pub async fn create_supplier(&self, payload: &SupplierPayload) -> ClientResult<Supplier> {
        self.post("/api/suppliers", payload).await
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        payload: &SupplierPayload,
    ) -> ClientResult<Supplier> {
        self.put(&format!("/api/suppliers/{}", id), payload).await
    }

    pub async fn delete_supplier(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/api/suppliers/{}", id)).await
    }

    // Products

    pub async fn list_products(
        &self,
        query: &ListQuery,
    ) -> ClientResult<PaginatedResponse<Product>> {
        self.get(&format!("/api/products{}", query.to_query_string()))
            .await
    }

    pub async fn get_product(&self, id: Uuid) -> ClientResult<Product> {
        self.get(&format!("/api/products/{}", id)).await
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> ClientResult<Product> {
        self.post("/api/products", payload).await
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: &ProductPayload,
    ) -> ClientResult<Product> {
        self.put(&format!("/api/products/{}", id), payload).await
    }

    pub async fn delete_product(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/api/products/{}", id)).await
    }

    // Warehouses

    pub async fn list_warehouses(
        &self,
        query: &ListQuery,
    ) -> ClientResult<PaginatedResponse<Warehouse>> {
        self.get(&format!("/api/warehouses{}", query.to_query_string()))
            .await
    }

    pub async fn get_warehouse(&self, id: Uuid) -> ClientResult<Warehouse> {
        self.get(&format!("/api/warehouses/{}", id)).await
    }

    pub async fn create_warehouse(&self, payload: &WarehousePayload) -> ClientResult<Warehouse> {
        self.post("/api/warehouses", payload).await
    }

    pub async fn update_warehouse(
        &self,
        id: Uuid,
        payload: &WarehousePayload,
    ) -> ClientResult<Warehouse> {
        self.put(&format!("/api/warehouses/{}", id), payload).await
    }

    pub async fn delete_warehouse(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/api/warehouses/{}", id)).await
    }

    // Purchase orders

    pub async fn list_purchase_orders(
        &self,
        query: &ListQuery,
    ) -> ClientResult<PaginatedResponse<PurchaseOrder>> {
        self.get(&format!("/api/purchase-orders{}", query.to_query_string()))
            .await
    }

    pub async fn get_purchase_order(&self, id: Uuid) -> ClientResult<PurchaseOrder> {
        self.get(&format!("/api/purchase-orders/{}", id)).await
    }

    pub async fn create_purchase_order(
        &self,
        payload: &PurchaseOrderPayload,
    ) -> ClientResult<PurchaseOrder> {
        self.post("/api/purchase-orders", payload).await
    }

    pub async fn update_purchase_order(
        &self,
        id: Uuid,
        payload: &PurchaseOrderPayload,
    ) -> ClientResult<PurchaseOrder> {
        self.put(&format!("/api/purchase-orders/{}", id), payload)
            .await
    }

    pub async fn set_purchase_order_status(
        &self,
        id: Uuid,
        status: PoStatus,
    ) -> ClientResult<PurchaseOrder> {
        #[derive(Serialize)]
        struct StatusPayload {
            status: PoStatus,
        }
        self.put(
            &format!("/api/purchase-orders/{}/status", id),
            &StatusPayload { status },
        )
        .await
    }

    pub async fn delete_purchase_order(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/api/purchase-orders/{}", id)).await
    }

    pub async fn purchase_order_analytics(&self) -> ClientResult<Value> {
        self.get("/api/purchase-orders/analytics").await
    }

    pub async fn seed_purchase_orders(&self) -> ClientResult<Vec<PurchaseOrder>> {
        self.post("/api/purchase-orders/seed", &()).await
    }

    // Shipments

    pub async fn list_shipments(
        &self,
        query: &ListQuery,
    ) -> ClientResult<PaginatedResponse<Shipment>> {
        self.get(&format!("/api/shipments{}", query.to_query_string()))
            .await
    }

    pub async fn get_shipment(&self, id: Uuid) -> ClientResult<Shipment> {
        self.get(&format!("/api/shipments/{}", id)).await
    }

    pub async fn create_shipment(&self, payload: &ShipmentPayload) -> ClientResult<Shipment> {
        self.post("/api/shipments", payload).await
    }

    pub async fn update_shipment(
        &self,
        id: Uuid,
        payload: &ShipmentPayload,
    ) -> ClientResult<Shipment> {
        self.put(&format!("/api/shipments/{}", id), payload).await
    }

    pub async fn set_shipment_status(
        &self,
        id: Uuid,
        payload: &ShipmentStatusPayload,
    ) -> ClientResult<Shipment> {
        self.put(&format!("/api/shipments/{}/status", id), payload)
            .await
    }

    pub async fn cancel_shipment(&self, id: Uuid) -> ClientResult<Shipment> {
        self.delete(&format!("/api/shipments/{}", id)).await
    }

    pub async fn shipment_analytics(&self) -> ClientResult<Value> {
        self.get("/api/shipments/analytics").await
    }

    pub async fn seed_shipments(&self) -> ClientResult<Vec<Shipment>> {
        self.post("/api/shipments/seed", &()).await
    }

    // Inventory

    pub async fn list_inventory(&self) -> ClientResult<Vec<InventoryItem>> {
        self.get("/api/inventory").await
    }

    pub async fn inventory_summary(&self) -> ClientResult<Value> {
        self.get("/api/inventory/summary").await
    }

    pub async fn adjust_inventory(&self, payload: &AdjustPayload) -> ClientResult<InventoryItem> {
        self.post("/api/inventory/adjust", payload).await
    }

    pub async fn reserve_inventory(&self, payload: &ReservePayload) -> ClientResult<InventoryItem> {
        self.post("/api/inventory/reserve", payload).await
    }

    pub async fn release_inventory(&self, payload: &ReservePayload) -> ClientResult<InventoryItem> {
        self.post("/api/inventory/release", payload).await
    }

    pub async fn transfer_inventory(&self, payload: &TransferPayload) -> ClientResult<()> {
        self.post("/api/inventory/transfer", payload).await
    }

    pub async fn set_reorder_level(
        &self,
        payload: &ReorderLevelPayload,
    ) -> ClientResult<InventoryItem> {
        self.put("/api/inventory/reorder-level", payload).await
    }

    pub async fn inventory_history(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> ClientResult<Vec<InventoryMovement>> {
        self.get(&format!(
            "/api/inventory/{}/{}/history",
            product_id, warehouse_id
        ))
        .await
    }

    // Analytics

    pub async fn dashboard(&self) -> ClientResult<Value> {
        self.get("/api/analytics/dashboard").await
    }

    pub async fn export_inventory_csv(&self) -> ClientResult<String> {
        self.get_text("/api/analytics/inventory/export").await
    }

    // Users and settings

    pub async fn profile(&self) -> ClientResult<User> {
        self.get("/api/users/profile").await
    }

    pub async fn update_profile(&self, display_name: &str) -> ClientResult<User> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ProfilePayload<'a> {
            display_name: &'a str,
        }
        self.put("/api/users/profile", &ProfilePayload { display_name })
            .await
    }

    pub async fn change_password(&self, payload: &ChangePasswordPayload) -> ClientResult<Value> {
        self.put("/api/users/password", payload).await
    }

    pub async fn set_profile_picture(&self, url: Option<&str>) -> ClientResult<User> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct PicturePayload<'a> {
            profile_picture_url: Option<&'a str>,
        }
        self.put(
            "/api/users/profile-picture",
            &PicturePayload {
                profile_picture_url: url,
            },
        )
        .await
    }

    pub async fn update_preferences(&self, preferences: &UserPreferences) -> ClientResult<User> {
        self.put("/api/users/preferences", preferences).await
    }

    pub async fn set_account_status(&self, user_id: Uuid, is_active: bool) -> ClientResult<User> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct StatusPayload {
            user_id: Uuid,
            is_active: bool,
        }
        self.put("/api/users/status", &StatusPayload { user_id, is_active })
            .await
    }

    pub async fn get_settings(&self) -> ClientResult<Value> {
        self.get("/api/settings").await
    }

    pub async fn update_settings(&self, patch: &Value) -> ClientResult<Value> {
        self.put("/api/settings", patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_empty() {
        assert_eq!(ListQuery::default().to_query_string(), "");
    }

    #[test]
    fn test_query_string_joins_parameters() {
        let query = ListQuery {
            search: Some("acme".to_string()),
            status: Some("ACTIVE".to_string()),
            page: Some(2),
            per_page: Some(50),
        };
        assert_eq!(
            query.to_query_string(),
            "?search=acme&status=ACTIVE&page=2&per_page=50"
        );
    }

    #[test]
    fn test_query_string_encodes_reserved_characters() {
        let query = ListQuery {
            search: Some("bolts & nuts".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(query.to_query_string(), "?search=bolts+%26+nuts");
    }

    #[test]
    fn test_query_string_encodes_equals_and_hash() {
        let query = ListQuery {
            search: Some("a=b#c".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(query.to_query_string(), "?search=a%3Db%23c");
    }
}
