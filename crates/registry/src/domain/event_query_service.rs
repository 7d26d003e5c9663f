use crate::domain::PageRequest;
use common::domain::{DomainResult, ListMotionEventsRepoInput, MotionEvent, MotionEventRepository};
use std::sync::Arc;
use tracing::instrument;

/// Read access to stored motion events
pub struct EventQueryService {
    motion_event_repository: Arc<dyn MotionEventRepository>,
}

impl EventQueryService {
    pub fn new(motion_event_repository: Arc<dyn MotionEventRepository>) -> Self {
        Self {
            motion_event_repository,
        }
    }

    /// List events, optionally restricted to one device's storage ID
    #[instrument(skip(self, page), fields(offset = page.offset, limit = page.limit()))]
    pub async fn list_motion_events(
        &self,
        device_id: Option<i64>,
        page: PageRequest,
    ) -> DomainResult<Vec<MotionEvent>> {
        common::garde::validate(&page)?;

        self.motion_event_repository
            .list_motion_events(ListMotionEventsRepoInput {
                device_id,
                offset: page.offset,
                limit: page.limit(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{DomainError, MockMotionEventRepository};

    fn event(id: i64, device_id: i64) -> MotionEvent {
        MotionEvent {
            id,
            device_id,
            event_type: "motion".to_string(),
            status: "DETECTED".to_string(),
            timestamp_device: "1714557600".to_string(),
            timestamp_server: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_motion_events_for_device() {
        let mut mock_repo = MockMotionEventRepository::new();
        mock_repo
            .expect_list_motion_events()
            .withf(|input: &ListMotionEventsRepoInput| {
                input.device_id == Some(3) && input.offset == 0 && input.limit == 100
            })
            .times(1)
            .return_once(|_| Ok(vec![event(1, 3), event(2, 3)]));

        let service = EventQueryService::new(Arc::new(mock_repo));
        let events = service
            .list_motion_events(Some(3), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.device_id == 3));
    }

    #[tokio::test]
    async fn test_list_motion_events_rejects_negative_offset() {
        let mut mock_repo = MockMotionEventRepository::new();
        mock_repo.expect_list_motion_events().times(0);

        let service = EventQueryService::new(Arc::new(mock_repo));
        let result = service
            .list_motion_events(None, PageRequest::new(-5, 10))
            .await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
