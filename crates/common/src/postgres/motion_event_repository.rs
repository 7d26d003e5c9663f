use crate::domain::{
    CreateMotionEventRepoInput, DomainError, DomainResult, ListMotionEventsRepoInput,
    MotionEvent, MotionEventRepository,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::{debug, instrument};

/// Motion event row for PostgreSQL storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionEventRow {
    pub id: i64,
    pub device_id: i64,
    pub event_type: String,
    pub status: String,
    pub timestamp_device: String,
    pub timestamp_server: DateTime<Utc>,
}

impl From<&Row> for MotionEventRow {
    fn from(row: &Row) -> Self {
        MotionEventRow {
            id: row.get(0),
            device_id: row.get(1),
            event_type: row.get(2),
            status: row.get(3),
            timestamp_device: row.get(4),
            timestamp_server: row.get(5),
        }
    }
}

impl From<MotionEventRow> for MotionEvent {
    fn from(row: MotionEventRow) -> Self {
        MotionEvent {
            id: row.id,
            device_id: row.device_id,
            event_type: row.event_type,
            status: row.status,
            timestamp_device: row.timestamp_device,
            timestamp_server: row.timestamp_server,
        }
    }
}

/// PostgreSQL implementation of MotionEventRepository trait
#[derive(Clone)]
pub struct PostgresMotionEventRepository {
    client: PostgresClient,
}

impl PostgresMotionEventRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MotionEventRepository for PostgresMotionEventRepository {
    #[instrument(skip(self, input), fields(device_id = input.device_id, status = %input.status))]
    async fn create_motion_event(
        &self,
        input: CreateMotionEventRepoInput,
    ) -> DomainResult<MotionEvent> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        // timestamp_server is assigned by the column default
        let result = conn
            .query_one(
                "INSERT INTO motion_events (device_id, event_type, status, timestamp_device)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, device_id, event_type, status, timestamp_device, timestamp_server",
                &[
                    &input.device_id,
                    &input.event_type,
                    &input.status,
                    &input.timestamp_device,
                ],
            )
            .await;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                if let Some(db_err) = e.as_db_error() {
                    // 23503 is foreign_key_violation
                    if db_err.code().code() == "23503" {
                        return Err(DomainError::DeviceNotFound(input.device_id.to_string()));
                    }
                }
                return Err(DomainError::RepositoryError(e.into()));
            }
        };

        let event: MotionEvent = MotionEventRow::from(&row).into();
        debug!(event_id = event.id, "stored motion event");

        Ok(event)
    }

    #[instrument(skip(self, input), fields(device_id = ?input.device_id, offset = input.offset, limit = input.limit))]
    async fn list_motion_events(
        &self,
        input: ListMotionEventsRepoInput,
    ) -> DomainResult<Vec<MotionEvent>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = match input.device_id {
            Some(device_id) => {
                conn.query(
                    "SELECT id, device_id, event_type, status, timestamp_device, timestamp_server
                     FROM motion_events
                     WHERE device_id = $1
                     ORDER BY id OFFSET $2 LIMIT $3",
                    &[&device_id, &input.offset, &input.limit],
                )
                .await
            }
            None => {
                conn.query(
                    "SELECT id, device_id, event_type, status, timestamp_device, timestamp_server
                     FROM motion_events
                     ORDER BY id OFFSET $1 LIMIT $2",
                    &[&input.offset, &input.limit],
                )
                .await
            }
        }
        .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let events: Vec<MotionEvent> = rows
            .iter()
            .map(|row| MotionEventRow::from(row).into())
            .collect();

        debug!("found {} motion events", events.len());

        Ok(events)
    }
}
