use crate::domain::{compose_alert_email, AlertError, CooldownTracker, MailTransport};
use async_trait::async_trait;
use common::domain::{AlertDispatcher, AlertOutcome, MotionAlert};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertNotifierConfig {
    pub sender_email: String,
    pub sender_password: String,
    /// Upper bound for one transmission, including connect and auth
    pub send_timeout_secs: u64,
}

impl AlertNotifierConfig {
    pub fn has_credentials(&self) -> bool {
        !self.sender_email.trim().is_empty() && !self.sender_password.is_empty()
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

impl Default for AlertNotifierConfig {
    fn default() -> Self {
        Self {
            sender_email: String::new(),
            sender_password: String::new(),
            send_timeout_secs: 30,
        }
    }
}

/// Sends motion alert emails, at most one per device per cooldown period
///
/// Flow:
/// 1. Refuse without network I/O when sender credentials are missing
/// 2. Suppress the alert while the device is cooling down
/// 3. Compose the templated email and hand it to the transport
/// 4. Start a new cooldown window only after a successful send
pub struct AlertNotifier {
    config: AlertNotifierConfig,
    cooldown: Arc<CooldownTracker>,
    transport: Arc<dyn MailTransport>,
}

impl AlertNotifier {
    pub fn new(
        config: AlertNotifierConfig,
        cooldown: Arc<CooldownTracker>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            config,
            cooldown,
            transport,
        }
    }

    /// Send an alert; returns true only if the email was handed to the relay
    pub async fn send(
        &self,
        receiver_email: &str,
        device_name: &str,
        device_external_id: &str,
        status: &str,
    ) -> bool {
        let alert = MotionAlert {
            receiver_email: receiver_email.to_string(),
            device_name: device_name.to_string(),
            device_external_id: device_external_id.to_string(),
            status: status.to_string(),
        };
        self.dispatch(&alert).await.is_sent()
    }

    async fn transmit(&self, alert: &MotionAlert) -> Result<(), AlertError> {
        let email = compose_alert_email(&self.config.sender_email, alert)?;
        let timeout = self.config.send_timeout();

        tokio::time::timeout(timeout, self.transport.send(email))
            .await
            .map_err(|_| AlertError::Timeout(timeout))?
    }
}

#[async_trait]
impl AlertDispatcher for AlertNotifier {
    #[instrument(
        skip(self, alert),
        fields(device_external_id = %alert.device_external_id, status = %alert.status)
    )]
    async fn dispatch(&self, alert: &MotionAlert) -> AlertOutcome {
        if !self.config.has_credentials() {
            error!("sender email credentials not configured, alert not sent");
            return AlertOutcome::NotConfigured;
        }

        if let Some(remaining) = self.cooldown.remaining(&alert.device_external_id).await {
            info!(
                remaining_secs = remaining.as_secs(),
                "alert for device is cooling down, not sent"
            );
            return AlertOutcome::CooldownActive;
        }

        debug!(receiver = %alert.receiver_email, "sending motion alert");

        match self.transmit(alert).await {
            Ok(()) => {
                self.cooldown.record_sent(&alert.device_external_id).await;
                info!(
                    receiver = %alert.receiver_email,
                    device_name = %alert.device_name,
                    "motion alert sent"
                );
                AlertOutcome::Sent
            }
            Err(e) => {
                warn!(
                    receiver = %alert.receiver_email,
                    error = %e,
                    "failed to send motion alert"
                );
                AlertOutcome::Failed(e.to_string())
            }
        }
    }
}
