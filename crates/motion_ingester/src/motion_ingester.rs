use crate::domain::MotionEventService;
use crate::mqtt::{MqttConfig, MqttSubscriber};
use common::domain::{AlertDispatcher, DeviceRepository, MotionEventRepository, UserRepository};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct MotionIngester {
    subscriber: MqttSubscriber,
}

impl MotionIngester {
    pub fn new(
        config: MqttConfig,
        device_repository: Arc<dyn DeviceRepository>,
        user_repository: Arc<dyn UserRepository>,
        motion_event_repository: Arc<dyn MotionEventRepository>,
        alert_dispatcher: Arc<dyn AlertDispatcher>,
    ) -> anyhow::Result<Self> {
        debug!("initializing motion ingester");

        let service = Arc::new(MotionEventService::new(
            device_repository,
            user_repository,
            motion_event_repository,
            alert_dispatcher,
        ));
        let subscriber = MqttSubscriber::new(config, service)?;

        Ok(Self { subscriber })
    }

    #[allow(clippy::type_complexity)]
    pub fn into_runner_process(
        self,
    ) -> Box<
        dyn FnOnce(
                CancellationToken,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
            > + Send,
    > {
        // MQTT receive loop - one message at a time until shutdown
        Box::new({
            let subscriber = self.subscriber;
            move |ctx| Box::pin(async move { subscriber.run(ctx).await })
        })
    }
}
