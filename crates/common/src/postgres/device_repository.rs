use crate::domain::{
    CreateDeviceRepoInput, Device, DeviceRepository, DomainError, DomainResult,
    GetDeviceByExternalIdRepoInput, GetDeviceRepoInput, ListDevicesRepoInput,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracing::{debug, instrument};

const DEVICE_COLUMNS: &str =
    "id, device_id_mqtt, name, location, owner_id, is_active, created_at";

/// Device row for PostgreSQL storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRow {
    pub id: i64,
    pub device_id_mqtt: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for DeviceRow {
    fn from(row: &Row) -> Self {
        DeviceRow {
            id: row.get(0),
            device_id_mqtt: row.get(1),
            name: row.get(2),
            location: row.get(3),
            owner_id: row.get(4),
            is_active: row.get(5),
            created_at: row.get(6),
        }
    }
}

/// Convert database DeviceRow to domain Device
impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Device {
            id: row.id,
            external_id: row.device_id_mqtt, // Map device_id_mqtt -> external_id
            name: row.name.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            owner_id: row.owner_id,
            is_active: row.is_active,
            created_at: Some(row.created_at),
        }
    }
}

/// PostgreSQL implementation of DeviceRepository trait
#[derive(Clone)]
pub struct PostgresDeviceRepository {
    client: PostgresClient,
}

impl PostgresDeviceRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeviceRepository for PostgresDeviceRepository {
    #[instrument(skip(self, input), fields(external_id = %input.external_id, owner_id = input.owner_id))]
    async fn create_device(&self, input: CreateDeviceRepoInput) -> DomainResult<Device> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let result = conn
            .query_one(
                &format!(
                    "INSERT INTO devices (device_id_mqtt, name, location, owner_id)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {}",
                    DEVICE_COLUMNS
                ),
                &[
                    &input.external_id, // Map external_id -> device_id_mqtt
                    &input.name,
                    &input.location,
                    &input.owner_id,
                ],
            )
            .await;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                if let Some(db_err) = e.as_db_error() {
                    // PostgreSQL error code 23505 is unique_violation
                    if db_err.code().code() == "23505" {
                        return Err(DomainError::DeviceAlreadyExists(input.external_id));
                    }
                    // 23503 is foreign_key_violation (owner does not exist)
                    if db_err.code().code() == "23503" {
                        return Err(DomainError::UserNotFound(input.owner_id.to_string()));
                    }
                }
                return Err(DomainError::RepositoryError(e.into()));
            }
        };

        let device: Device = DeviceRow::from(&row).into();
        debug!(device_id = device.id, "registered device: {}", device.external_id);

        Ok(device)
    }

    #[instrument(skip(self, input), fields(device_id = input.device_id))]
    async fn get_device(&self, input: GetDeviceRepoInput) -> DomainResult<Option<Device>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM devices WHERE id = $1", DEVICE_COLUMNS),
                &[&input.device_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| DeviceRow::from(&row).into()))
    }

    #[instrument(skip(self, input), fields(external_id = %input.external_id))]
    async fn get_device_by_external_id(
        &self,
        input: GetDeviceByExternalIdRepoInput,
    ) -> DomainResult<Option<Device>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!(
                    "SELECT {} FROM devices WHERE device_id_mqtt = $1",
                    DEVICE_COLUMNS
                ),
                &[&input.external_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        match row {
            Some(row) => {
                let device_row = DeviceRow::from(&row);
                debug!(device_id = device_row.id, "resolved device by external id");
                Ok(Some(device_row.into()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, input), fields(offset = input.offset, limit = input.limit))]
    async fn list_devices(&self, input: ListDevicesRepoInput) -> DomainResult<Vec<Device>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM devices ORDER BY id OFFSET $1 LIMIT $2",
                    DEVICE_COLUMNS
                ),
                &[&input.offset, &input.limit],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let devices: Vec<Device> = rows
            .iter()
            .map(|row| DeviceRow::from(row).into())
            .collect();

        debug!("found {} devices", devices.len());

        Ok(devices)
    }
}
