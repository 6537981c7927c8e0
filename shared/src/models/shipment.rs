//! Shipments and tracking events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shipment of goods between two locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(alias = "SHIPMENT_ID", alias = "shipment_id")]
    pub id: Uuid,
    /// Tracking number (e.g. "SHP-2024-00031")
    #[serde(alias = "SHIPMENT_NUMBER", alias = "shipment_number")]
    pub shipment_number: String,
    #[serde(alias = "CARRIER")]
    pub carrier: String,
    #[serde(alias = "MODE")]
    pub mode: ShipmentMode,
    #[serde(alias = "ORIGIN")]
    pub origin: String,
    #[serde(alias = "DESTINATION")]
    pub destination: String,
    /// Linked purchase order, when the shipment fulfils one
    #[serde(alias = "PO_ID", alias = "po_id")]
    pub purchase_order_id: Option<Uuid>,
    #[serde(alias = "STATUS")]
    pub status: ShipmentStatus,
    /// 0-100
    #[serde(alias = "PROGRESS_PERCENT", alias = "progress_percent")]
    pub progress_percent: i32,
    #[serde(alias = "ETA")]
    pub eta: Option<DateTime<Utc>>,
    #[serde(default, alias = "TRACKING_EVENTS", alias = "tracking_events")]
    pub tracking_events: Vec<TrackingEvent>,
    #[serde(alias = "CREATED_AT", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UPDATED_AT", alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Transport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentMode {
    Air,
    Sea,
    #[default]
    Ground,
}

impl ShipmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentMode::Air => "AIR",
            ShipmentMode::Sea => "SEA",
            ShipmentMode::Ground => "GROUND",
        }
    }
}

/// Shipment lifecycle status.
///
/// CREATED -> IN_TRANSIT -> DELIVERED. A shipment in transit may be
/// flagged DELAYED and later recover to IN_TRANSIT or complete directly.
/// CANCELLED is terminal and unreachable once delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    #[default]
    Created,
    InTransit,
    Delayed,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Created => "CREATED",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delayed => "DELAYED",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }

    /// Whether the shipment may move from `self` to `next`
    pub fn can_transition_to(&self, next: ShipmentStatus) -> bool {
        use ShipmentStatus::*;
        match (self, next) {
            (Created, InTransit) => true,
            (InTransit, Delayed) => true,
            (Delayed, InTransit) => true,
            (InTransit | Delayed, Delivered) => true,
            (Created | InTransit | Delayed, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(ShipmentStatus::Created),
            "IN_TRANSIT" => Ok(ShipmentStatus::InTransit),
            "DELAYED" => Ok(ShipmentStatus::Delayed),
            "DELIVERED" => Ok(ShipmentStatus::Delivered),
            "CANCELLED" => Ok(ShipmentStatus::Cancelled),
            _ => Err("Unknown shipment status"),
        }
    }
}

impl std::str::FromStr for ShipmentMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AIR" => Ok(ShipmentMode::Air),
            "SEA" => Ok(ShipmentMode::Sea),
            "GROUND" => Ok(ShipmentMode::Ground),
            _ => Err("Unknown shipment mode"),
        }
    }
}

/// A point-in-time tracking entry (stored as a JSON document list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: ShipmentStatus,
    pub location: Option<String>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Clamp a reported progress value into the displayable 0-100 range
pub fn clamp_progress(percent: i32) -> i32 {
    percent.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use ShipmentStatus::*;
        assert!(Created.can_transition_to(InTransit));
        assert!(InTransit.can_transition_to(Delivered));
    }

    #[test]
    fn test_delay_is_recoverable() {
        use ShipmentStatus::*;
        assert!(InTransit.can_transition_to(Delayed));
        assert!(Delayed.can_transition_to(InTransit));
        assert!(Delayed.can_transition_to(Delivered));
    }

    #[test]
    fn test_cannot_cancel_after_delivery() {
        assert!(!ShipmentStatus::Delivered.can_transition_to(ShipmentStatus::Cancelled));
    }

    #[test]
    fn test_cannot_skip_created_to_delivered() {
        assert!(!ShipmentStatus::Created.can_transition_to(ShipmentStatus::Delivered));
    }

    #[test]
    fn test_terminal_states() {
        assert!(ShipmentStatus::Delivered.is_terminal());
        assert!(ShipmentStatus::Cancelled.is_terminal());
        assert!(!ShipmentStatus::Delayed.is_terminal());
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(-10), 0);
        assert_eq!(clamp_progress(50), 50);
        assert_eq!(clamp_progress(140), 100);
    }
}
