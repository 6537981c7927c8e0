//! Shipment service: CRUD, status transitions with tracking events,
//! analytics, and demo data seeding.
//!
//! Tracking events live as a JSON document list on the shipment row and
//! are appended on every status change.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{clamp_progress, Shipment, ShipmentMode, ShipmentStatus, TrackingEvent};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

/// Shipment service
#[derive(Clone)]
pub struct ShipmentService {
    db: PgPool,
}

/// Filters for listing shipments
#[derive(Debug, Default, Deserialize)]
pub struct ShipmentFilter {
    pub search: Option<String>,
    pub status: Option<ShipmentStatus>,
    pub carrier: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ShipmentFilter {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Input for creating a shipment (always starts in CREATED)
#[derive(Debug, Deserialize)]
pub struct CreateShipmentInput {
    pub carrier: String,
    pub mode: Option<ShipmentMode>,
    pub origin: String,
    pub destination: String,
    pub purchase_order_id: Option<Uuid>,
    pub eta: Option<DateTime<Utc>>,
}

/// Input for updating shipment details (not status)
#[derive(Debug, Deserialize)]
pub struct UpdateShipmentInput {
    pub carrier: Option<String>,
    pub mode: Option<ShipmentMode>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub eta: Option<DateTime<Utc>>,
}

/// Input for a status transition with optional tracking detail
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentStatusInput {
    pub status: ShipmentStatus,
    pub progress_percent: Option<i32>,
    pub location: Option<String>,
    pub note: Option<String>,
}

/// Aggregate figures for the shipment dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentAnalytics {
    pub total_shipments: i64,
    pub in_transit: i64,
    pub delayed: i64,
    pub delivered: i64,
    pub by_status: Vec<ShipmentBucket>,
    pub by_mode: Vec<ShipmentBucket>,
}

#[derive(Debug, Serialize)]
pub struct ShipmentBucket {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, FromRow)]
struct ShipmentRow {
    id: Uuid,
    shipment_number: String,
    carrier: String,
    mode: String,
    origin: String,
    destination: String,
    purchase_order_id: Option<Uuid>,
    status: String,
    progress_percent: i32,
    eta: Option<DateTime<Utc>>,
    tracking_events: Json<Vec<TrackingEvent>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShipmentRow {
    fn into_model(self) -> AppResult<Shipment> {
        let mode = self
            .mode
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad shipment mode: {}", self.mode)))?;
        let status = self
            .status
            .parse()
            .map_err(|_| AppError::Internal(format!("Bad shipment status: {}", self.status)))?;
        Ok(Shipment {
            id: self.id,
            shipment_number: self.shipment_number,
            carrier: self.carrier,
            mode,
            origin: self.origin,
            destination: self.destination,
            purchase_order_id: self.purchase_order_id,
            status,
            progress_percent: self.progress_percent,
            eta: self.eta,
            tracking_events: self.tracking_events.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SHIPMENT_COLUMNS: &str = "id, shipment_number, carrier, mode, origin, destination, \
                                purchase_order_id, status, progress_percent, eta, \
                                tracking_events, created_at, updated_at";

impl ShipmentService {
    /// Create a new ShipmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List shipments with filters and pagination
    pub async fn list(&self, filter: ShipmentFilter) -> AppResult<PaginatedResponse<Shipment>> {
        let pagination = filter.pagination();
        let search = filter.search.as_deref().map(|s| format!("%{}%", s));
        let status = filter.status.map(|s| s.as_str());
        let carrier = filter.carrier.as_deref().map(|c| format!("%{}%", c));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM shipments
            WHERE ($1::text IS NULL OR shipment_number ILIKE $1 OR origin ILIKE $1
                   OR destination ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR carrier ILIKE $3)
            "#,
        )
        .bind(&search)
        .bind(status)
        .bind(&carrier)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            SELECT {SHIPMENT_COLUMNS} FROM shipments
            WHERE ($1::text IS NULL OR shipment_number ILIKE $1 OR origin ILIKE $1
                   OR destination ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR carrier ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(&search)
        .bind(status)
        .bind(&carrier)
        .bind(i64::from(pagination.per_page.max(1)))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(ShipmentRow::into_model)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Get a shipment by id
    pub async fn get(&self, shipment_id: Uuid) -> AppResult<Shipment> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1"
        ))
        .bind(shipment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;

        row.into_model()
    }

    /// Create a shipment in CREATED with an initial tracking event
    pub async fn create(&self, input: CreateShipmentInput) -> AppResult<Shipment> {
        if input.carrier.trim().is_empty() {
            return Err(AppError::Validation {
                field: "carrier".to_string(),
                message: "Carrier is required".to_string(),
            });
        }
        if input.origin.trim().is_empty() || input.destination.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Origin and destination are required".to_string(),
            ));
        }

        if let Some(po_id) = input.purchase_order_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM purchase_orders WHERE id = $1)",
            )
            .bind(po_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Purchase order".to_string()));
            }
        }

        let shipment_number = self.next_shipment_number().await?;
        let mode = input.mode.unwrap_or_default();
        let initial_event = TrackingEvent {
            status: ShipmentStatus::Created,
            location: Some(input.origin.clone()),
            note: Some("Shipment created".to_string()),
            recorded_at: Utc::now(),
        };

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            INSERT INTO shipments
                (shipment_number, carrier, mode, origin, destination, purchase_order_id,
                 status, progress_percent, eta, tracking_events)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9)
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(&shipment_number)
        .bind(&input.carrier)
        .bind(mode.as_str())
        .bind(&input.origin)
        .bind(&input.destination)
        .bind(input.purchase_order_id)
        .bind(ShipmentStatus::Created.as_str())
        .bind(input.eta)
        .bind(Json(vec![initial_event]))
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Update shipment details. Terminal shipments are read-only.
    pub async fn update(
        &self,
        shipment_id: Uuid,
        input: UpdateShipmentInput,
    ) -> AppResult<Shipment> {
        let current = self.get(shipment_id).await?;
        if current.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Shipment is {} and can no longer be edited",
                current.status
            )));
        }

        let carrier = input.carrier.unwrap_or(current.carrier);
        let mode = input.mode.unwrap_or(current.mode);
        let origin = input.origin.unwrap_or(current.origin);
        let destination = input.destination.unwrap_or(current.destination);
        let eta = input.eta.or(current.eta);

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            UPDATE shipments
            SET carrier = $1, mode = $2, origin = $3, destination = $4, eta = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(&carrier)
        .bind(mode.as_str())
        .bind(&origin)
        .bind(&destination)
        .bind(eta)
        .bind(shipment_id)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Move the shipment to a new status, appending a tracking event.
    /// Delivery forces progress to 100. The row stays locked while the
    /// transition is validated, so concurrent transitions serialize
    /// instead of both passing a stale check.
    pub async fn set_status(
        &self,
        shipment_id: Uuid,
        input: ShipmentStatusInput,
    ) -> AppResult<Shipment> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 FOR UPDATE"
        ))
        .bind(shipment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?
        .into_model()?;

        if !current.status.can_transition_to(input.status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move shipment from {} to {}",
                current.status, input.status
            )));
        }

        let progress = match input.status {
            ShipmentStatus::Delivered => 100,
            _ => clamp_progress(input.progress_percent.unwrap_or(current.progress_percent)),
        };

        let event = TrackingEvent {
            status: input.status,
            location: input.location,
            note: input.note,
            recorded_at: Utc::now(),
        };

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            UPDATE shipments
            SET status = $1, progress_percent = $2,
                tracking_events = tracking_events || $3::jsonb,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(input.status.as_str())
        .bind(progress)
        .bind(Json(vec![event]))
        .bind(shipment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_model()
    }

    /// Cancel a shipment. Shipments are never hard-deleted.
    pub async fn cancel(&self, shipment_id: Uuid) -> AppResult<Shipment> {
        self.set_status(
            shipment_id,
            ShipmentStatusInput {
                status: ShipmentStatus::Cancelled,
                progress_percent: None,
                location: None,
                note: Some("Shipment cancelled".to_string()),
            },
        )
        .await
    }

    /// Status and mode breakdowns for the shipment dashboard
    pub async fn analytics(&self) -> AppResult<ShipmentAnalytics> {
        #[derive(FromRow)]
        struct BucketRow {
            key: String,
            count: i64,
        }

        let by_status = sqlx::query_as::<_, BucketRow>(
            "SELECT status AS key, COUNT(*) AS count FROM shipments GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.db)
        .await?;

        let by_mode = sqlx::query_as::<_, BucketRow>(
            "SELECT mode AS key, COUNT(*) AS count FROM shipments GROUP BY mode ORDER BY mode",
        )
        .fetch_all(&self.db)
        .await?;

        let count_for = |rows: &[BucketRow], key: &str| {
            rows.iter()
                .find(|b| b.key == key)
                .map(|b| b.count)
                .unwrap_or(0)
        };

        let total_shipments = by_status.iter().map(|b| b.count).sum();
        let in_transit = count_for(&by_status, "IN_TRANSIT");
        let delayed = count_for(&by_status, "DELAYED");
        let delivered = count_for(&by_status, "DELIVERED");

        let bucket = |rows: Vec<BucketRow>| {
            rows.into_iter()
                .map(|b| ShipmentBucket {
                    key: b.key,
                    count: b.count,
                })
                .collect()
        };

        Ok(ShipmentAnalytics {
            total_shipments,
            in_transit,
            delayed,
            delivered,
            by_status: bucket(by_status),
            by_mode: bucket(by_mode),
        })
    }

    /// Create a handful of demo shipments
    pub async fn seed(&self) -> AppResult<Vec<Shipment>> {
        let samples = [
            ("Maersk", ShipmentMode::Sea, "Shanghai", "Rotterdam", 21),
            ("DHL", ShipmentMode::Air, "Frankfurt", "Chicago", 2),
            ("DSV", ShipmentMode::Ground, "Hamburg", "Warsaw", 4),
        ];

        let mut created = Vec::new();
        for (carrier, mode, origin, destination, days) in samples {
            let shipment = self
                .create(CreateShipmentInput {
                    carrier: carrier.to_string(),
                    mode: Some(mode),
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    purchase_order_id: None,
                    eta: Some(Utc::now() + Duration::days(days)),
                })
                .await?;
            created.push(shipment);
        }

        Ok(created)
    }

    /// Numbers are sequential within a calendar year, e.g. "SHP-2026-00031".
    /// The counter lives in the database so concurrent creates never hand
    /// out the same number.
    async fn next_shipment_number(&self) -> AppResult<String> {
        let year = Utc::now().year();
        let sequence: i64 = sqlx::query_scalar("SELECT get_next_document_number($1, $2)")
            .bind("SHP")
            .bind(year)
            .fetch_one(&self.db)
            .await?;

        Ok(format_shipment_number(year, sequence))
    }
}

fn format_shipment_number(year: i32, sequence: i64) -> String {
    format!("SHP-{}-{:05}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_number_format() {
        assert_eq!(format_shipment_number(2026, 31), "SHP-2026-00031");
        assert_eq!(format_shipment_number(2026, 123_456), "SHP-2026-123456");
    }
}
