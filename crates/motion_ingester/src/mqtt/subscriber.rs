use crate::domain::{IngestOutcome, MotionEventService};
use crate::mqtt::{ConnectionState, MqttConfig, TopicFilter};
use async_trait::async_trait;
use common::domain::DomainResult;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, Outgoing, Packet, QoS,
    SubscribeReasonCode,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument, Span};

const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// Stream of broker events driving the receive loop
#[async_trait]
trait EventSource: Send {
    async fn next_event(&mut self) -> Result<Event, ConnectionError>;
}

#[async_trait]
impl EventSource for EventLoop {
    async fn next_event(&mut self) -> Result<Event, ConnectionError> {
        self.poll().await
    }
}

/// Keeps one broker session alive and feeds every matching publish through
/// the ingestion pipeline, one message at a time.
pub struct MqttSubscriber {
    config: MqttConfig,
    filter: TopicFilter,
    service: Arc<MotionEventService>,
    state: watch::Sender<ConnectionState>,
}

impl MqttSubscriber {
    pub fn new(config: MqttConfig, service: Arc<MotionEventService>) -> DomainResult<Self> {
        let filter = TopicFilter::parse(&config.topic_filter)?;
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            config,
            filter,
            service,
            state,
        })
    }

    /// Observe connection state changes
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "MQTT connection state changed");
        }
    }

    /// Run the receive loop until the token is cancelled.
    ///
    /// Connection errors never end the loop: rumqttc reconnects on the next
    /// poll and the subscription is renewed on every ConnAck. Cancellation is
    /// only observed between messages.
    #[instrument(
        name = "mqtt_subscriber",
        skip_all,
        fields(
            host = %self.config.host,
            port = self.config.port,
            topic_filter = %self.filter,
        )
    )]
    pub async fn run(&self, token: CancellationToken) -> anyhow::Result<()> {
        info!("starting MQTT subscriber");

        let (client, mut eventloop) =
            AsyncClient::new(self.config.mqtt_options(), self.config.channel_capacity);
        self.receive(&client, &mut eventloop, &token).await;

        info!("MQTT subscriber stopped");
        Ok(())
    }

    /// Poll `events` and handle each one until the token is cancelled, then
    /// disconnect. A message already being handled runs to completion.
    async fn receive<E: EventSource>(
        &self,
        client: &AsyncClient,
        events: &mut E,
        token: &CancellationToken,
    ) {
        self.set_state(ConnectionState::Connecting);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    debug!("shutdown signal received");
                    break;
                }
                event = events.next_event() => {
                    match event {
                        Ok(event) => self.handle_event(client, event).await,
                        Err(e) => {
                            error!(error = %e, "MQTT connection error");
                            self.set_state(ConnectionState::Disconnected);

                            tokio::select! {
                                _ = token.cancelled() => break,
                                _ = tokio::time::sleep(self.config.reconnect_delay()) => {}
                            }

                            warn!(
                                delay_secs = self.config.reconnect_delay_secs,
                                "reconnecting to MQTT broker"
                            );
                            self.set_state(ConnectionState::Connecting);
                        }
                    }
                }
            }
        }

        disconnect(client, events).await;
        self.set_state(ConnectionState::Disconnected);
    }

    async fn handle_event(&self, client: &AsyncClient, event: Event) {
        match event {
            Event::Incoming(Packet::Publish(publish)) => {
                self.handle_publish(&publish.topic, &publish.payload).await;
            }
            Event::Incoming(Packet::ConnAck(ack)) => {
                if ack.code != ConnectReturnCode::Success {
                    warn!(code = ?ack.code, "MQTT broker refused connection");
                    return;
                }

                info!("connected to MQTT broker");
                // A clean session drops subscriptions, so renew on every connect
                if let Err(e) = client
                    .subscribe(self.filter.as_str(), QoS::AtLeastOnce)
                    .await
                {
                    error!(error = %e, "failed to queue MQTT subscription");
                }
            }
            Event::Incoming(Packet::SubAck(ack)) => {
                if ack
                    .return_codes
                    .iter()
                    .all(|code| matches!(code, SubscribeReasonCode::Success(_)))
                {
                    info!(topic_filter = %self.filter, "subscribed to MQTT topic filter");
                    self.set_state(ConnectionState::Subscribed);
                } else {
                    error!(
                        topic_filter = %self.filter,
                        return_codes = ?ack.return_codes,
                        "MQTT broker rejected subscription"
                    );
                }
            }
            Event::Incoming(Packet::Disconnect) => {
                warn!("MQTT broker closed the session");
                self.set_state(ConnectionState::Disconnected);
            }
            Event::Incoming(Packet::PingResp) => {
                // Connection is healthy
            }
            _ => {}
        }
    }

    /// Handle one inbound publish inside its own trace.
    ///
    /// Never fails: every error is logged here so the receive loop keeps going.
    pub(crate) async fn handle_publish(&self, topic: &str, payload: &[u8]) -> Option<IngestOutcome> {
        let span = info_span!(
            parent: Span::none(),
            "mqtt_message",
            topic = %topic,
            payload_size = payload.len(),
        );

        async {
            if !self.filter.matches(topic) {
                warn!(topic_filter = %self.filter, "topic does not match filter, skipping message");
                return None;
            }

            match self.service.ingest(topic, payload).await {
                Ok(outcome) => {
                    match &outcome {
                        IngestOutcome::Stored { event, alert } => debug!(
                            event_id = event.id,
                            alert = ?alert,
                            "message ingested"
                        ),
                        IngestOutcome::Dropped(reason) => {
                            debug!(reason = %reason, "message dropped")
                        }
                    }
                    Some(outcome)
                }
                Err(e) => {
                    error!(error = %e, "failed to ingest MQTT message");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Send DISCONNECT and give the event loop a moment to flush it
async fn disconnect<E: EventSource>(client: &AsyncClient, events: &mut E) {
    if let Err(e) = client.try_disconnect() {
        debug!(error = %e, "could not queue MQTT disconnect");
        return;
    }

    let flush = async {
        loop {
            match events.next_event().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };

    if tokio::time::timeout(DISCONNECT_GRACE, flush).await.is_err() {
        debug!("MQTT disconnect not flushed before timeout");
    }
}
