//! Business logic services for the Supply Chain Management Platform

pub mod analytics;
pub mod auth;
pub mod inventory;
pub mod product;
pub mod purchase_order;
pub mod settings;
pub mod shipment;
pub mod supplier;
pub mod user;
pub mod warehouse;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use purchase_order::PurchaseOrderService;
pub use settings::SettingsService;
pub use shipment::ShipmentService;
pub use supplier::SupplierService;
pub use user::UserService;
pub use warehouse::WarehouseService;
