//! HTTP handlers for shipment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::shipment::{
    CreateShipmentInput, ShipmentAnalytics, ShipmentFilter, ShipmentStatusInput,
    UpdateShipmentInput,
};
use crate::services::ShipmentService;
use crate::AppState;
use shared::models::Shipment;
use shared::types::PaginatedResponse;

/// List shipments
pub async fn list_shipments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<ShipmentFilter>,
) -> AppResult<Json<PaginatedResponse<Shipment>>> {
    let service = ShipmentService::new(state.db);
    let page = service.list(filter).await?;
    Ok(Json(page))
}

/// Get a shipment
pub async fn get_shipment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<Json<Shipment>> {
    let service = ShipmentService::new(state.db);
    let shipment = service.get(shipment_id).await?;
    Ok(Json(shipment))
}

/// Create a shipment
pub async fn create_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateShipmentInput>,
) -> AppResult<Json<Shipment>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = ShipmentService::new(state.db);
    let shipment = service.create(input).await?;
    Ok(Json(shipment))
}

/// Update shipment details
pub async fn update_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
    Json(input): Json<UpdateShipmentInput>,
) -> AppResult<Json<Shipment>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = ShipmentService::new(state.db);
    let shipment = service.update(shipment_id, input).await?;
    Ok(Json(shipment))
}

/// Move a shipment to a new status
pub async fn set_shipment_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
    Json(input): Json<ShipmentStatusInput>,
) -> AppResult<Json<Shipment>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = ShipmentService::new(state.db);
    let shipment = service.set_status(shipment_id, input).await?;
    Ok(Json(shipment))
}

/// Cancel a shipment (shipments are never hard-deleted)
pub async fn cancel_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<Json<Shipment>> {
    if !current_user.0.can_write() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = ShipmentService::new(state.db);
    let shipment = service.cancel(shipment_id).await?;
    Ok(Json(shipment))
}

/// Shipment analytics
pub async fn shipment_analytics(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ShipmentAnalytics>> {
    let service = ShipmentService::new(state.db);
    let analytics = service.analytics().await?;
    Ok(Json(analytics))
}

/// Seed demo shipments
pub async fn seed_shipments(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Shipment>>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = ShipmentService::new(state.db);
    let shipments = service.seed().await?;
    Ok(Json(shipments))
}
