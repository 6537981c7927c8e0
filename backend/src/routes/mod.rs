//! Route definitions for the Supply Chain Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .nest("/suppliers", supplier_routes())
        .nest("/products", product_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/inventory", inventory_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/shipments", shipment_routes())
        .nest("/analytics", analytics_routes())
        .nest("/users", user_routes())
        .nest("/settings", settings_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh-token", post(handlers::refresh_token))
        .route("/forgot-password", post(handlers::forgot_password))
}

/// Supplier master data routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product master data routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse master data routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory))
        .route("/summary", get(handlers::inventory_summary))
        .route("/adjust", post(handlers::adjust_inventory))
        .route("/reserve", post(handlers::reserve_inventory))
        .route("/release", post(handlers::release_inventory))
        .route("/transfer", post(handlers::transfer_inventory))
        .route("/reorder-level", put(handlers::set_reorder_level))
        .route(
            "/:product_id/:warehouse_id/history",
            get(handlers::inventory_history),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase order routes (protected)
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route("/analytics", get(handlers::purchase_order_analytics))
        .route("/seed", post(handlers::seed_purchase_orders))
        .route(
            "/:order_id",
            get(handlers::get_purchase_order)
                .put(handlers::update_purchase_order)
                .delete(handlers::delete_purchase_order),
        )
        .route("/:order_id/status", put(handlers::set_purchase_order_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shipment routes (protected). Deleting a shipment cancels it.
fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_shipments).post(handlers::create_shipment),
        )
        .route("/analytics", get(handlers::shipment_analytics))
        .route("/seed", post(handlers::seed_shipments))
        .route(
            "/:shipment_id",
            get(handlers::get_shipment)
                .put(handlers::update_shipment)
                .delete(handlers::cancel_shipment),
        )
        .route("/:shipment_id/status", put(handlers::set_shipment_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Cross-entity analytics routes (protected)
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/inventory/export", get(handlers::export_inventory))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// User profile routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/password", put(handlers::change_password))
        .route("/profile-picture", put(handlers::set_profile_picture))
        .route("/preferences", put(handlers::update_preferences))
        .route("/status", put(handlers::set_account_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Application settings routes (protected)
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
