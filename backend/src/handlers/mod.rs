//! HTTP handlers for the Supply Chain Management Platform

pub mod analytics;
pub mod auth;
pub mod health;
pub mod inventory;
pub mod product;
pub mod purchase_order;
pub mod settings;
pub mod shipment;
pub mod supplier;
pub mod user;
pub mod warehouse;

pub use analytics::*;
pub use auth::*;
pub use health::*;
pub use inventory::*;
pub use product::*;
pub use purchase_order::*;
pub use settings::*;
pub use shipment::*;
pub use supplier::*;
pub use user::*;
pub use warehouse::*;
