use alert_notifier::{
    AlertEmail, AlertNotifier, AlertNotifierConfig, CooldownTracker, MockMailTransport,
};
use chrono::Utc;
use common::domain::{
    AlertOutcome, CreateMotionEventRepoInput, Device, MockDeviceRepository,
    MockMotionEventRepository, MockUserRepository, MotionEvent, User,
};
use motion_ingester::MotionEventService;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PAYLOAD: &[u8] = br#"{"device_id":"esp32-1","event_type":"motion","status":"DETECTED","timestamp_device":"2024-05-01T10:00:00Z"}"#;

fn repositories() -> (
    MockDeviceRepository,
    MockUserRepository,
    MockMotionEventRepository,
) {
    let mut devices = MockDeviceRepository::new();
    devices.expect_get_device_by_external_id().returning(|_| {
        Ok(Some(Device {
            id: 1,
            external_id: "esp32-1".to_string(),
            name: "Front door".to_string(),
            location: "General".to_string(),
            owner_id: Some(10),
            is_active: true,
            created_at: Some(Utc::now()),
        }))
    });

    let mut users = MockUserRepository::new();
    users.expect_get_user().returning(|_| {
        Ok(Some(User {
            id: 10,
            email: "a@b.com".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
        }))
    });

    let next_id = Arc::new(AtomicI64::new(1));
    let mut events = MockMotionEventRepository::new();
    events
        .expect_create_motion_event()
        .times(2)
        .returning(move |input: CreateMotionEventRepoInput| {
            Ok(MotionEvent {
                id: next_id.fetch_add(1, Ordering::SeqCst),
                device_id: input.device_id,
                event_type: input.event_type,
                status: input.status,
                timestamp_device: input.timestamp_device,
                timestamp_server: Utc::now(),
            })
        });

    (devices, users, events)
}

#[tokio::test(start_paused = true)]
async fn test_repeated_detection_within_cooldown_alerts_once() {
    let (devices, users, events) = repositories();

    let mut transport = MockMailTransport::new();
    transport
        .expect_send()
        .withf(|email: &AlertEmail| {
            email.to == "a@b.com" && email.subject == "Motion alert: Front door reported DETECTED!"
        })
        .times(1)
        .returning(|_| Ok(()));

    let notifier = AlertNotifier::new(
        AlertNotifierConfig {
            sender_email: "alerts@motionwatch.dev".to_string(),
            sender_password: "app-password".to_string(),
            send_timeout_secs: 30,
        },
        Arc::new(CooldownTracker::default()),
        Arc::new(transport),
    );

    let service = MotionEventService::new(
        Arc::new(devices),
        Arc::new(users),
        Arc::new(events),
        Arc::new(notifier),
    );

    let first = service
        .ingest("sensors/esp32-1/events", PAYLOAD)
        .await
        .unwrap();
    assert_eq!(first.stored_event().unwrap().id, 1);
    assert_eq!(first.alert(), Some(&AlertOutcome::Sent));

    tokio::time::advance(Duration::from_secs(10)).await;

    let second = service
        .ingest("sensors/esp32-1/events", PAYLOAD)
        .await
        .unwrap();
    assert_eq!(second.stored_event().unwrap().id, 2);
    assert_eq!(second.alert(), Some(&AlertOutcome::CooldownActive));
}
