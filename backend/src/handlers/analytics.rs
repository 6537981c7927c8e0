//! HTTP handlers for cross-entity analytics

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::analytics::DashboardSnapshot;
use crate::services::AnalyticsService;
use crate::AppState;

/// Dashboard snapshot
pub async fn dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<DashboardSnapshot>> {
    let service = AnalyticsService::new(state.db);
    let snapshot = service.dashboard().await?;
    Ok(Json(snapshot))
}

/// Download all inventory positions as CSV
pub async fn export_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = AnalyticsService::new(state.db);
    let csv = service.export_inventory_csv().await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory.csv\"",
            ),
        ],
        csv,
    ))
}
