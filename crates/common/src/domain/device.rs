use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub const DEFAULT_DEVICE_NAME: &str = "Unknown Device";
pub const DEFAULT_DEVICE_LOCATION: &str = "General";

/// Registered motion sensor.
///
/// `id` is the storage identifier; `external_id` is the identifier the device
/// publishes under on the broker. Inbound events are always resolved by
/// `external_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub location: String,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Name used in alerts, falling back to the external identifier
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.external_id
        } else {
            &self.name
        }
    }
}

/// Repository input for registering a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDeviceRepoInput {
    pub external_id: String,
    pub name: String,
    pub location: String,
    pub owner_id: i64,
}

/// Repository input for getting a device by storage ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDeviceRepoInput {
    pub device_id: i64,
}

/// Repository input for resolving a device by its broker identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDeviceByExternalIdRepoInput {
    pub external_id: String,
}

/// Repository input for paging through devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDevicesRepoInput {
    pub offset: i64,
    pub limit: i64,
}

/// Repository trait for device storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Register a new device; fails with `DeviceAlreadyExists` on a duplicate external ID
    async fn create_device(&self, input: CreateDeviceRepoInput) -> DomainResult<Device>;

    /// Get a device by storage ID
    async fn get_device(&self, input: GetDeviceRepoInput) -> DomainResult<Option<Device>>;

    /// Get a device by the identifier it uses on the broker
    async fn get_device_by_external_id(
        &self,
        input: GetDeviceByExternalIdRepoInput,
    ) -> DomainResult<Option<Device>>;

    /// List devices ordered by storage ID
    async fn list_devices(&self, input: ListDevicesRepoInput) -> DomainResult<Vec<Device>>;
}
