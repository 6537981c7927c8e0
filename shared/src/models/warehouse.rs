//! Warehouse master data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A warehouse or distribution site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    #[serde(alias = "WAREHOUSE_ID", alias = "warehouse_id")]
    pub id: Uuid,
    /// Short unique code (e.g. "RTM-01")
    #[serde(alias = "WAREHOUSE_CODE", alias = "warehouse_code")]
    pub code: String,
    #[serde(alias = "WAREHOUSE_NAME", alias = "warehouse_name")]
    pub name: String,
    #[serde(alias = "CITY")]
    pub city: Option<String>,
    #[serde(alias = "COUNTRY")]
    pub country: Option<String>,
    #[serde(alias = "WAREHOUSE_TYPE", alias = "warehouse_type", alias = "type")]
    pub warehouse_type: WarehouseType,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UPDATED_AT", alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Kind of warehouse site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseType {
    #[default]
    Distribution,
    Fulfillment,
    ColdStorage,
    Bonded,
}

impl WarehouseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseType::Distribution => "DISTRIBUTION",
            WarehouseType::Fulfillment => "FULFILLMENT",
            WarehouseType::ColdStorage => "COLD_STORAGE",
            WarehouseType::Bonded => "BONDED",
        }
    }
}

impl std::str::FromStr for WarehouseType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISTRIBUTION" => Ok(WarehouseType::Distribution),
            "FULFILLMENT" => Ok(WarehouseType::Fulfillment),
            "COLD_STORAGE" => Ok(WarehouseType::ColdStorage),
            "BONDED" => Ok(WarehouseType::Bonded),
            _ => Err("Unknown warehouse type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_type_field() {
        let json = r#"{
            "WAREHOUSE_ID": "7f8e2a5e-1b68-4c4f-9df7-0d6f62c7a003",
            "WAREHOUSE_CODE": "RTM-01",
            "WAREHOUSE_NAME": "Rotterdam Central",
            "CITY": "Rotterdam",
            "COUNTRY": "NL",
            "type": "COLD_STORAGE",
            "CREATED_AT": "2024-01-10T08:00:00Z",
            "UPDATED_AT": "2024-01-10T08:00:00Z"
        }"#;
        let w: Warehouse = serde_json::from_str(json).unwrap();
        assert_eq!(w.warehouse_type, WarehouseType::ColdStorage);
    }
}
