//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    AdjustInput, InventoryFilter, InventorySummary, ReorderLevelInput, ReserveInput, TransferInput,
};
use crate::services::InventoryService;
use crate::AppState;
use shared::models::{InventoryItem, InventoryMovement};

/// List stock positions
pub async fn list_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<InventoryFilter>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.db);
    let items = service.list(filter).await?;
    Ok(Json(items))
}

/// Per-warehouse inventory summary
pub async fn inventory_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<InventorySummary>>> {
    let service = InventoryService::new(state.db);
    let summary = service.summary().await?;
    Ok(Json(summary))
}

/// Adjust on-hand stock
pub async fn adjust_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustInput>,
) -> AppResult<Json<InventoryItem>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.db);
    let item = service.adjust(current_user.0.user_id, input).await?;
    Ok(Json(item))
}

/// Reserve available stock
pub async fn reserve_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReserveInput>,
) -> AppResult<Json<InventoryItem>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.db);
    let item = service.reserve(current_user.0.user_id, input).await?;
    Ok(Json(item))
}

/// Release reserved stock
pub async fn release_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReserveInput>,
) -> AppResult<Json<InventoryItem>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.db);
    let item = service.release(current_user.0.user_id, input).await?;
    Ok(Json(item))
}

/// Transfer stock between warehouses
pub async fn transfer_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<Json<()>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.db);
    service.transfer(current_user.0.user_id, input).await?;
    Ok(Json(()))
}

/// Set the reorder point for a position
pub async fn set_reorder_level(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReorderLevelInput>,
) -> AppResult<Json<InventoryItem>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.db);
    let item = service.set_reorder_level(current_user.0.user_id, input).await?;
    Ok(Json(item))
}

/// Movement history for a stock position
pub async fn inventory_history(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<InventoryMovement>>> {
    let service = InventoryService::new(state.db);
    let movements = service.history(product_id, warehouse_id).await?;
    Ok(Json(movements))
}
