//! Domain models for the Supply Chain Management Platform

pub mod inventory;
pub mod product;
pub mod purchase_order;
pub mod shipment;
pub mod supplier;
pub mod user;
pub mod warehouse;

pub use inventory::*;
pub use product::*;
pub use purchase_order::*;
pub use shipment::*;
pub use supplier::*;
pub use user::*;
pub use warehouse::*;
