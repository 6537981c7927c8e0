//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, PoAnalytics, PurchaseOrderFilter, StatusInput,
    UpdatePurchaseOrderInput,
};
use crate::services::PurchaseOrderService;
use crate::AppState;
use shared::models::PurchaseOrder;
use shared::types::PaginatedResponse;

/// List purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<PurchaseOrderFilter>,
) -> AppResult<Json<PaginatedResponse<PurchaseOrder>>> {
    let service = PurchaseOrderService::new(state.db);
    let page = service.list(filter).await?;
    Ok(Json(page))
}

/// Get a purchase order
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service.get(order_id).await?;
    Ok(Json(order))
}

/// Create a purchase order in DRAFT
pub async fn create_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrder>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = PurchaseOrderService::new(state.db);
    let order = service.create(input).await?;
    Ok(Json(order))
}

/// Update a DRAFT purchase order
pub async fn update_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrder>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = PurchaseOrderService::new(state.db);
    let order = service.update(order_id, input).await?;
    Ok(Json(order))
}

/// Move a purchase order to a new status
pub async fn set_purchase_order_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<StatusInput>,
) -> AppResult<Json<PurchaseOrder>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = PurchaseOrderService::new(state.db);
    let order = service.set_status(order_id, input.status).await?;
    Ok(Json(order))
}

/// Delete a DRAFT purchase order
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = PurchaseOrderService::new(state.db);
    service.delete(order_id).await?;
    Ok(Json(()))
}

/// Purchase order analytics
pub async fn purchase_order_analytics(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<PoAnalytics>> {
    let service = PurchaseOrderService::new(state.db);
    let analytics = service.analytics().await?;
    Ok(Json(analytics))
}

/// Seed demo purchase orders
pub async fn seed_purchase_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = PurchaseOrderService::new(state.db);
    let orders = service.seed().await?;
    Ok(Json(orders))
}
