//! Supplier master data
//!
//! Deserialization accepts camelCase, snake_case, and legacy
//! UPPER_SNAKE_CASE field names so records from older Oracle-backed
//! exports load without a translation step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplier of goods
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(alias = "SUPPLIER_ID", alias = "supplier_id")]
    pub id: Uuid,
    /// Short unique code (e.g. "ACME01")
    #[serde(alias = "SUPPLIER_CODE", alias = "supplier_code")]
    pub code: String,
    #[serde(alias = "SUPPLIER_NAME", alias = "supplier_name")]
    pub name: String,
    #[serde(alias = "CONTACT_PERSON", alias = "contact_person")]
    pub contact_person: Option<String>,
    #[serde(alias = "EMAIL")]
    pub email: Option<String>,
    #[serde(alias = "PHONE")]
    pub phone: Option<String>,
    #[serde(alias = "CITY")]
    pub city: Option<String>,
    #[serde(alias = "COUNTRY")]
    pub country: Option<String>,
    #[serde(default, alias = "STATUS")]
    pub status: SupplierStatus,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UPDATED_AT", alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of a supplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Active => "ACTIVE",
            SupplierStatus::Inactive => "INACTIVE",
        }
    }
}

impl std::str::FromStr for SupplierStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SupplierStatus::Active),
            "INACTIVE" => Ok(SupplierStatus::Inactive),
            _ => Err("Unknown supplier status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "7f8e2a5e-1b68-4c4f-9df7-0d6f62c7a001",
            "code": "ACME01",
            "name": "Acme Industrial",
            "contactPerson": "Dana Reyes",
            "email": "dana@acme.example",
            "phone": null,
            "city": "Rotterdam",
            "country": "NL",
            "status": "ACTIVE",
            "createdAt": "2024-01-10T08:00:00Z",
            "updatedAt": "2024-01-10T08:00:00Z"
        }"#;
        let s: Supplier = serde_json::from_str(json).unwrap();
        assert_eq!(s.code, "ACME01");
        assert_eq!(s.contact_person.as_deref(), Some("Dana Reyes"));
    }

    #[test]
    fn test_deserialize_upper_snake_case() {
        let json = r#"{
            "SUPPLIER_ID": "7f8e2a5e-1b68-4c4f-9df7-0d6f62c7a001",
            "SUPPLIER_CODE": "ACME01",
            "SUPPLIER_NAME": "Acme Industrial",
            "CONTACT_PERSON": "Dana Reyes",
            "EMAIL": "dana@acme.example",
            "PHONE": "+31-10-5550100",
            "CITY": "Rotterdam",
            "COUNTRY": "NL",
            "STATUS": "ACTIVE",
            "CREATED_AT": "2024-01-10T08:00:00Z",
            "UPDATED_AT": "2024-01-10T08:00:00Z"
        }"#;
        let s: Supplier = serde_json::from_str(json).unwrap();
        assert_eq!(s.name, "Acme Industrial");
        assert_eq!(s.status, SupplierStatus::Active);
    }
}
