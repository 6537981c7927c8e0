//! Product master data

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product tracked through the supply chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "PRODUCT_ID", alias = "product_id")]
    pub id: Uuid,
    /// Stock keeping unit (e.g. "WID-1042")
    #[serde(alias = "SKU")]
    pub sku: String,
    #[serde(alias = "PRODUCT_NAME", alias = "product_name")]
    pub name: String,
    #[serde(alias = "DESCRIPTION")]
    pub description: Option<String>,
    #[serde(alias = "UNIT_PRICE", alias = "unit_price")]
    pub unit_price: Decimal,
    #[serde(alias = "COST_PRICE", alias = "cost_price")]
    pub cost_price: Decimal,
    #[serde(alias = "MIN_STOCK_LEVEL", alias = "min_stock_level")]
    pub min_stock_level: i32,
    #[serde(default, alias = "STATUS")]
    pub status: ProductStatus,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UPDATED_AT", alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Margin per unit (unit price minus cost price)
    pub fn unit_margin(&self) -> Decimal {
        self.unit_price - self.cost_price
    }
}

/// Lifecycle status of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
            ProductStatus::Discontinued => "DISCONTINUED",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ProductStatus::Active),
            "INACTIVE" => Ok(ProductStatus::Inactive),
            "DISCONTINUED" => Ok(ProductStatus::Discontinued),
            _ => Err("Unknown product status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_unit_margin() {
        let p = Product {
            id: Uuid::new_v4(),
            sku: "WID-1042".to_string(),
            name: "Widget".to_string(),
            description: None,
            unit_price: Decimal::from_str("12.50").unwrap(),
            cost_price: Decimal::from_str("8.00").unwrap(),
            min_stock_level: 10,
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(p.unit_margin(), Decimal::from_str("4.50").unwrap());
    }

    #[test]
    fn test_deserialize_oracle_row_shape() {
        let json = r#"{
            "PRODUCT_ID": "7f8e2a5e-1b68-4c4f-9df7-0d6f62c7a002",
            "SKU": "WID-1042",
            "PRODUCT_NAME": "Widget",
            "DESCRIPTION": null,
            "UNIT_PRICE": "12.50",
            "COST_PRICE": "8.00",
            "MIN_STOCK_LEVEL": 10,
            "STATUS": "DISCONTINUED",
            "CREATED_AT": "2024-01-10T08:00:00Z",
            "UPDATED_AT": "2024-01-10T08:00:00Z"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, ProductStatus::Discontinued);
        assert_eq!(p.min_stock_level, 10);
    }
}
