//! Purchase orders and their status state machine

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchase order placed with a supplier for delivery to a warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(alias = "PO_ID", alias = "po_id")]
    pub id: Uuid,
    /// Order number (e.g. "PO-2024-00017")
    #[serde(alias = "PO_NUMBER", alias = "po_number")]
    pub po_number: String,
    #[serde(alias = "SUPPLIER_ID", alias = "supplier_id")]
    pub supplier_id: Uuid,
    #[serde(alias = "WAREHOUSE_ID", alias = "warehouse_id")]
    pub warehouse_id: Uuid,
    #[serde(default, alias = "PRIORITY")]
    pub priority: PoPriority,
    #[serde(alias = "STATUS")]
    pub status: PoStatus,
    #[serde(default, alias = "LINES", alias = "line_items", alias = "lineItems")]
    pub lines: Vec<PurchaseOrderLine>,
    #[serde(alias = "TOTAL_AMOUNT", alias = "total_amount")]
    pub total_amount: Decimal,
    #[serde(alias = "EXPECTED_DATE", alias = "expected_date")]
    pub expected_date: Option<NaiveDate>,
    #[serde(alias = "NOTES")]
    pub notes: Option<String>,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UPDATED_AT", alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// One line item on a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    #[serde(alias = "LINE_ID", alias = "line_id")]
    pub id: Uuid,
    #[serde(alias = "PRODUCT_ID", alias = "product_id")]
    pub product_id: Uuid,
    #[serde(alias = "SKU")]
    pub sku: String,
    #[serde(alias = "QUANTITY")]
    pub quantity: i64,
    #[serde(alias = "UNIT_COST", alias = "unit_cost")]
    pub unit_cost: Decimal,
    /// Derived: quantity * unit cost
    #[serde(alias = "LINE_TOTAL", alias = "line_total")]
    pub line_total: Decimal,
}

impl PurchaseOrderLine {
    pub fn compute_total(quantity: i64, unit_cost: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_cost
    }
}

/// Order priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl PoPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoPriority::Low => "LOW",
            PoPriority::Normal => "NORMAL",
            PoPriority::High => "HIGH",
            PoPriority::Urgent => "URGENT",
        }
    }
}

/// Purchase order lifecycle status.
///
/// Forward path: DRAFT -> PENDING_APPROVAL -> APPROVED -> SENT ->
/// IN_TRANSIT -> PARTIALLY_RECEIVED -> RECEIVED. REJECTED is reachable
/// only from PENDING_APPROVAL; CANCELLED from any state before goods are
/// received. RECEIVED, CANCELLED, and REJECTED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Sent,
    InTransit,
    PartiallyReceived,
    Received,
    Cancelled,
    Rejected,
}

impl PoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Draft => "DRAFT",
            PoStatus::PendingApproval => "PENDING_APPROVAL",
            PoStatus::Approved => "APPROVED",
            PoStatus::Sent => "SENT",
            PoStatus::InTransit => "IN_TRANSIT",
            PoStatus::PartiallyReceived => "PARTIALLY_RECEIVED",
            PoStatus::Received => "RECEIVED",
            PoStatus::Cancelled => "CANCELLED",
            PoStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PoStatus::Received | PoStatus::Cancelled | PoStatus::Rejected
        )
    }

    /// Whether the order may move from `self` to `next`
    pub fn can_transition_to(&self, next: PoStatus) -> bool {
        use PoStatus::*;
        match (self, next) {
            (Draft, PendingApproval) => true,
            (PendingApproval, Approved) => true,
            (PendingApproval, Rejected) => true,
            (Approved, Sent) => true,
            (Sent, InTransit) => true,
            (InTransit, PartiallyReceived) => true,
            (InTransit, Received) => true,
            (PartiallyReceived, Received) => true,
            // Cancellation is allowed until goods start arriving
            (Draft | PendingApproval | Approved | Sent | InTransit, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PoStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(PoStatus::Draft),
            "PENDING_APPROVAL" => Ok(PoStatus::PendingApproval),
            "APPROVED" => Ok(PoStatus::Approved),
            "SENT" => Ok(PoStatus::Sent),
            "IN_TRANSIT" => Ok(PoStatus::InTransit),
            "PARTIALLY_RECEIVED" => Ok(PoStatus::PartiallyReceived),
            "RECEIVED" => Ok(PoStatus::Received),
            "CANCELLED" => Ok(PoStatus::Cancelled),
            "REJECTED" => Ok(PoStatus::Rejected),
            _ => Err("Unknown purchase order status"),
        }
    }
}

impl std::str::FromStr for PoPriority {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(PoPriority::Low),
            "NORMAL" => Ok(PoPriority::Normal),
            "HIGH" => Ok(PoPriority::High),
            "URGENT" => Ok(PoPriority::Urgent),
            _ => Err("Unknown priority"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_forward_path_is_valid() {
        use PoStatus::*;
        let path = [
            Draft,
            PendingApproval,
            Approved,
            Sent,
            InTransit,
            PartiallyReceived,
            Received,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?}", pair);
        }
    }

    #[test]
    fn test_skipping_stages_is_invalid() {
        assert!(!PoStatus::Draft.can_transition_to(PoStatus::Approved));
        assert!(!PoStatus::Approved.can_transition_to(PoStatus::Received));
    }

    #[test]
    fn test_rejected_only_from_pending_approval() {
        assert!(PoStatus::PendingApproval.can_transition_to(PoStatus::Rejected));
        assert!(!PoStatus::Draft.can_transition_to(PoStatus::Rejected));
        assert!(!PoStatus::Sent.can_transition_to(PoStatus::Rejected));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        use PoStatus::*;
        let all = [
            Draft,
            PendingApproval,
            Approved,
            Sent,
            InTransit,
            PartiallyReceived,
            Received,
            Cancelled,
            Rejected,
        ];
        for terminal in [Received, Cancelled, Rejected] {
            for next in all {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_cannot_cancel_partially_received() {
        assert!(!PoStatus::PartiallyReceived.can_transition_to(PoStatus::Cancelled));
    }

    #[test]
    fn test_line_total() {
        let total = PurchaseOrderLine::compute_total(4, Decimal::from_str("2.25").unwrap());
        assert_eq!(total, Decimal::from_str("9.00").unwrap());
    }
}
