use crate::domain::PageRequest;
use common::domain::{
    CreateDeviceRepoInput, Device, DeviceRepository, DomainError, DomainResult,
    GetDeviceByExternalIdRepoInput, GetDeviceRepoInput, GetUserInput, ListDevicesRepoInput,
    UserRepository, DEFAULT_DEVICE_LOCATION, DEFAULT_DEVICE_NAME,
};
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Request to register a device for an existing user
#[derive(Debug, Clone, Validate)]
pub struct RegisterDeviceRequest {
    /// Identifier the device publishes under
    #[garde(length(min = 1))]
    pub external_id: String,
    #[garde(skip)]
    pub name: Option<String>,
    #[garde(skip)]
    pub location: Option<String>,
    #[garde(skip)]
    pub owner_id: i64,
}

/// Domain service for device registration and lookup
pub struct DeviceService {
    device_repository: Arc<dyn DeviceRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl DeviceService {
    pub fn new(
        device_repository: Arc<dyn DeviceRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            device_repository,
            user_repository,
        }
    }

    /// Register a device; the owner must exist and the external ID must be unused
    #[instrument(skip(self, request), fields(external_id = %request.external_id, owner_id = request.owner_id))]
    pub async fn register_device(&self, request: RegisterDeviceRequest) -> DomainResult<Device> {
        common::garde::validate(&request)?;

        debug!(external_id = %request.external_id, "registering device");

        self.user_repository
            .get_user(GetUserInput {
                user_id: request.owner_id,
            })
            .await?
            .ok_or_else(|| DomainError::UserNotFound(request.owner_id.to_string()))?;

        let existing = self
            .device_repository
            .get_device_by_external_id(GetDeviceByExternalIdRepoInput {
                external_id: request.external_id.clone(),
            })
            .await?;
        if existing.is_some() {
            return Err(DomainError::DeviceAlreadyExists(request.external_id));
        }

        let device = self
            .device_repository
            .create_device(CreateDeviceRepoInput {
                external_id: request.external_id,
                name: non_blank_or(request.name, DEFAULT_DEVICE_NAME),
                location: non_blank_or(request.location, DEFAULT_DEVICE_LOCATION),
                owner_id: request.owner_id,
            })
            .await?;

        debug!(device_id = device.id, "device registered successfully");
        Ok(device)
    }

    /// Get device by storage ID
    #[instrument(skip(self))]
    pub async fn get_device(&self, device_id: i64) -> DomainResult<Device> {
        self.device_repository
            .get_device(GetDeviceRepoInput { device_id })
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))
    }

    #[instrument(skip(self, page), fields(offset = page.offset, limit = page.limit()))]
    pub async fn list_devices(&self, page: PageRequest) -> DomainResult<Vec<Device>> {
        common::garde::validate(&page)?;

        self.device_repository
            .list_devices(ListDevicesRepoInput {
                offset: page.offset,
                limit: page.limit(),
            })
            .await
    }
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
