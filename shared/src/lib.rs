//! Shared types and models for the Supply Chain Management Platform
//!
//! This crate contains types shared between the backend server and the
//! API client crate.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
