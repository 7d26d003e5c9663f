use async_trait::async_trait;
use std::fmt;

/// Alert request built by the ingestion pipeline for a qualifying event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionAlert {
    pub receiver_email: String,
    pub device_name: String,
    pub device_external_id: String,
    pub status: String,
}

/// Result of an alert dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Message handed to the relay
    Sent,
    /// Device alerted too recently; nothing sent
    CooldownActive,
    /// Sender credentials missing; nothing sent
    NotConfigured,
    /// Composition or transport failed
    Failed(String),
}

impl AlertOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, AlertOutcome::Sent)
    }
}

impl fmt::Display for AlertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertOutcome::Sent => write!(f, "sent"),
            AlertOutcome::CooldownActive => write!(f, "cooldown_active"),
            AlertOutcome::NotConfigured => write!(f, "not_configured"),
            AlertOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Sends motion alerts to device owners
///
/// Implementations never return errors: every failure is folded into
/// [`AlertOutcome::Failed`] so alerting can never fail ingestion.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn dispatch(&self, alert: &MotionAlert) -> AlertOutcome;
}
