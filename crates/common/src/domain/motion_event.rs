use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Stored motion event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionEvent {
    pub id: i64,
    pub device_id: i64,
    pub event_type: String,
    pub status: String,
    /// Timestamp as reported by the device, stored verbatim
    pub timestamp_device: String,
    /// Assigned by the store when the row is inserted
    pub timestamp_server: DateTime<Utc>,
}

/// Repository input for persisting a motion event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMotionEventRepoInput {
    pub device_id: i64,
    pub event_type: String,
    pub status: String,
    pub timestamp_device: String,
}

/// Repository input for listing motion events, optionally for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMotionEventsRepoInput {
    pub device_id: Option<i64>,
    pub offset: i64,
    pub limit: i64,
}

/// Repository trait for motion event storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MotionEventRepository: Send + Sync {
    /// Insert a motion event. No deduplication is performed.
    async fn create_motion_event(
        &self,
        input: CreateMotionEventRepoInput,
    ) -> DomainResult<MotionEvent>;

    /// List motion events ordered by ID
    async fn list_motion_events(
        &self,
        input: ListMotionEventsRepoInput,
    ) -> DomainResult<Vec<MotionEvent>>;
}
