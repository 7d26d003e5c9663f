use crate::domain::{DropReason, IngestOutcome, MotionPayload, ALERT_STATUS};
use common::domain::{
    AlertDispatcher, AlertOutcome, CreateMotionEventRepoInput, Device, DeviceRepository,
    DomainError, DomainResult, GetDeviceByExternalIdRepoInput, GetUserInput, MotionAlert,
    MotionEventRepository, UserRepository,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn, Span};

/// Domain service that turns inbound motion messages into stored events
///
/// Flow:
/// 1. Decode the JSON payload
/// 2. Resolve the device by its external ID
/// 3. Persist the motion event
/// 4. On a `DETECTED` status, alert the device owner
pub struct MotionEventService {
    device_repository: Arc<dyn DeviceRepository>,
    user_repository: Arc<dyn UserRepository>,
    motion_event_repository: Arc<dyn MotionEventRepository>,
    alert_dispatcher: Arc<dyn AlertDispatcher>,
}

impl MotionEventService {
    pub fn new(
        device_repository: Arc<dyn DeviceRepository>,
        user_repository: Arc<dyn UserRepository>,
        motion_event_repository: Arc<dyn MotionEventRepository>,
        alert_dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        Self {
            device_repository,
            user_repository,
            motion_event_repository,
            alert_dispatcher,
        }
    }

    /// Ingest one message.
    ///
    /// Malformed payloads and unknown devices are dropped and reported through
    /// the outcome. Only storage failures surface as errors.
    #[instrument(
        skip(self, payload),
        fields(payload_size = payload.len(), device_id = tracing::field::Empty)
    )]
    pub async fn ingest(&self, topic: &str, payload: &[u8]) -> DomainResult<IngestOutcome> {
        let payload = match MotionPayload::decode(payload) {
            Ok(p) => p,
            Err(DomainError::InvalidPayload(reason)) => {
                warn!(reason = %reason, "invalid motion payload, dropping message");
                return Ok(IngestOutcome::Dropped(DropReason::InvalidPayload(reason)));
            }
            Err(e) => return Err(e),
        };

        Span::current().record("device_id", payload.device_id.as_str());

        let Some(device) = self
            .device_repository
            .get_device_by_external_id(GetDeviceByExternalIdRepoInput {
                external_id: payload.device_id.clone(),
            })
            .await?
        else {
            warn!("device not registered, dropping message");
            return Ok(IngestOutcome::Dropped(DropReason::UnknownDevice(
                payload.device_id,
            )));
        };

        let event = self
            .motion_event_repository
            .create_motion_event(CreateMotionEventRepoInput {
                device_id: device.id,
                event_type: payload.event_type,
                status: payload.status,
                timestamp_device: payload.timestamp_device,
            })
            .await?;

        info!(
            event_id = event.id,
            status = %event.status,
            "stored motion event"
        );

        let alert = if event.status == ALERT_STATUS {
            self.alert_owner(&device, &event.status).await
        } else {
            None
        };

        Ok(IngestOutcome::Stored { event, alert })
    }

    /// Returns `None` when the device has no reachable owner
    async fn alert_owner(&self, device: &Device, status: &str) -> Option<AlertOutcome> {
        let Some(owner_id) = device.owner_id else {
            debug!("device has no owner, skipping alert");
            return None;
        };

        // The event is already stored; an owner lookup failure only costs the alert
        let owner = match self
            .user_repository
            .get_user(GetUserInput { user_id: owner_id })
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(owner_id, "device owner not found, skipping alert");
                return None;
            }
            Err(e) => {
                warn!(owner_id, error = %e, "failed to load device owner, skipping alert");
                return None;
            }
        };

        if owner.email.is_empty() {
            warn!(owner_id, "device owner has no email, skipping alert");
            return None;
        }

        let alert = MotionAlert {
            receiver_email: owner.email,
            device_name: device.display_name().to_string(),
            device_external_id: device.external_id.clone(),
            status: status.to_string(),
        };

        let outcome = self.alert_dispatcher.dispatch(&alert).await;
        debug!(outcome = %outcome, "alert dispatch finished");
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::domain::{
        MockAlertDispatcher, MockDeviceRepository, MockMotionEventRepository, MockUserRepository,
        MotionEvent, User,
    };

    const DETECTED_PAYLOAD: &[u8] = br#"{"device_id":"esp32-1","event_type":"motion","status":"DETECTED","timestamp_device":"2024-05-01T10:00:00Z"}"#;
    const TOPIC: &str = "sensors/esp32-1/events";

    fn device(owner_id: Option<i64>, name: &str) -> Device {
        Device {
            id: 7,
            external_id: "esp32-1".to_string(),
            name: name.to_string(),
            location: "Hallway".to_string(),
            owner_id,
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }

    fn owner(email: &str) -> User {
        User {
            id: 1,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
        }
    }

    fn stored_event(input: CreateMotionEventRepoInput) -> MotionEvent {
        MotionEvent {
            id: 100,
            device_id: input.device_id,
            event_type: input.event_type,
            status: input.status,
            timestamp_device: input.timestamp_device,
            timestamp_server: Utc::now(),
        }
    }

    fn service(
        devices: MockDeviceRepository,
        users: MockUserRepository,
        events: MockMotionEventRepository,
        dispatcher: MockAlertDispatcher,
    ) -> MotionEventService {
        MotionEventService::new(
            Arc::new(devices),
            Arc::new(users),
            Arc::new(events),
            Arc::new(dispatcher),
        )
    }

    fn device_lookup(found: Option<Device>) -> MockDeviceRepository {
        let mut devices = MockDeviceRepository::new();
        devices
            .expect_get_device_by_external_id()
            .withf(|input: &GetDeviceByExternalIdRepoInput| input.external_id == "esp32-1")
            .times(1)
            .return_once(move |_| Ok(found));
        devices
    }

    #[tokio::test]
    async fn test_detected_event_is_stored_and_alerted() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .withf(|input: &GetUserInput| input.user_id == 1)
            .times(1)
            .return_once(|_| Ok(Some(owner("a@b.com"))));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .withf(|input: &CreateMotionEventRepoInput| {
                input.device_id == 7
                    && input.event_type == "motion"
                    && input.status == "DETECTED"
                    && input.timestamp_device == "2024-05-01T10:00:00Z"
            })
            .times(1)
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|alert: &MotionAlert| {
                alert.receiver_email == "a@b.com"
                    && alert.device_name == "Hallway sensor"
                    && alert.device_external_id == "esp32-1"
                    && alert.status == "DETECTED"
            })
            .times(1)
            .returning(|_| AlertOutcome::Sent);

        let outcome = service(devices, users, events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        let event = outcome.stored_event().unwrap();
        assert_eq!(event.device_id, 7);
        assert_eq!(outcome.alert(), Some(&AlertOutcome::Sent));
    }

    #[tokio::test]
    async fn test_empty_device_name_falls_back_to_external_id() {
        let devices = device_lookup(Some(device(Some(1), "")));

        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .return_once(|_| Ok(Some(owner("a@b.com"))));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|alert: &MotionAlert| alert.device_name == "esp32-1")
            .times(1)
            .returning(|_| AlertOutcome::Sent);

        service(devices, users, events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_detected_status_is_stored_without_alert() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut users = MockUserRepository::new();
        users.expect_get_user().times(0);

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .times(1)
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let payload = br#"{"device_id":"esp32-1","event_type":"motion","status":"detected","timestamp_device":"1"}"#;
        let outcome = service(devices, users, events, dispatcher)
            .ingest(TOPIC, payload)
            .await
            .unwrap();

        assert_eq!(outcome.stored_event().unwrap().status, "detected");
        assert_eq!(outcome.alert(), None);
    }

    #[tokio::test]
    async fn test_missing_field_is_dropped_without_storage() {
        let mut devices = MockDeviceRepository::new();
        devices.expect_get_device_by_external_id().times(0);

        let mut events = MockMotionEventRepository::new();
        events.expect_create_motion_event().times(0);

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let payload = br#"{"device_id":"esp32-1","event_type":"motion","timestamp_device":"1"}"#;
        let outcome = service(devices, MockUserRepository::new(), events, dispatcher)
            .ingest(TOPIC, payload)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            IngestOutcome::Dropped(DropReason::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_device_is_dropped() {
        let devices = device_lookup(None);

        let mut events = MockMotionEventRepository::new();
        events.expect_create_motion_event().times(0);

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let outcome = service(devices, MockUserRepository::new(), events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            IngestOutcome::Dropped(DropReason::UnknownDevice("esp32-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_device_without_owner_skips_alert() {
        let devices = device_lookup(Some(device(None, "Hallway sensor")));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .times(1)
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let outcome = service(devices, MockUserRepository::new(), events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        assert!(outcome.stored_event().is_some());
        assert_eq!(outcome.alert(), None);
    }

    #[tokio::test]
    async fn test_owner_without_email_skips_alert() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .return_once(|_| Ok(Some(owner(""))));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let outcome = service(devices, users, events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        assert_eq!(outcome.alert(), None);
    }

    #[tokio::test]
    async fn test_only_empty_owner_email_skips_alert() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .return_once(|_| Ok(Some(owner(" "))));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|alert: &MotionAlert| alert.receiver_email == " ")
            .times(1)
            .returning(|_| AlertOutcome::Failed("invalid mail address".to_string()));

        let outcome = service(devices, users, events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        assert!(matches!(outcome.alert(), Some(AlertOutcome::Failed(_))));
    }

    #[tokio::test]
    async fn test_alert_failure_does_not_fail_ingestion() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .return_once(|_| Ok(Some(owner("a@b.com"))));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| AlertOutcome::Failed("relay unreachable".to_string()));

        let outcome = service(devices, users, events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        assert!(outcome.stored_event().is_some());
        assert!(matches!(outcome.alert(), Some(AlertOutcome::Failed(_))));
    }

    #[tokio::test]
    async fn test_owner_lookup_failure_keeps_stored_event() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut users = MockUserRepository::new();
        users.expect_get_user().return_once(|_| {
            Err(DomainError::RepositoryError(anyhow::anyhow!(
                "connection reset"
            )))
        });

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .times(1)
            .returning(|input| Ok(stored_event(input)));

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let outcome = service(devices, users, events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await
            .unwrap();

        assert!(outcome.stored_event().is_some());
        assert_eq!(outcome.alert(), None);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let devices = device_lookup(Some(device(Some(1), "Hallway sensor")));

        let mut events = MockMotionEventRepository::new();
        events.expect_create_motion_event().return_once(|_| {
            Err(DomainError::RepositoryError(anyhow::anyhow!(
                "connection reset"
            )))
        });

        let mut dispatcher = MockAlertDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let result = service(devices, MockUserRepository::new(), events, dispatcher)
            .ingest(TOPIC, DETECTED_PAYLOAD)
            .await;

        assert!(matches!(result, Err(DomainError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_identical_messages_store_two_events() {
        let mut devices = MockDeviceRepository::new();
        devices
            .expect_get_device_by_external_id()
            .times(2)
            .returning(|_| Ok(Some(device(None, "Hallway sensor"))));

        let mut events = MockMotionEventRepository::new();
        events
            .expect_create_motion_event()
            .times(2)
            .returning(|input| Ok(stored_event(input)));

        let service = service(
            devices,
            MockUserRepository::new(),
            events,
            MockAlertDispatcher::new(),
        );

        for _ in 0..2 {
            let outcome = service.ingest(TOPIC, DETECTED_PAYLOAD).await.unwrap();
            assert!(outcome.stored_event().is_some());
        }
    }
}
