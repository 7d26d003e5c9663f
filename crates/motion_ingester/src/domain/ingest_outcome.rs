use common::domain::{AlertOutcome, MotionEvent};
use std::fmt;

/// Status value that triggers an owner alert. Compared case-sensitively.
pub const ALERT_STATUS: &str = "DETECTED";

/// Why a message produced no stored event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    InvalidPayload(String),
    UnknownDevice(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::InvalidPayload(reason) => write!(f, "invalid payload: {}", reason),
            DropReason::UnknownDevice(external_id) => write!(f, "unknown device: {}", external_id),
        }
    }
}

/// Result of ingesting one inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Dropped(DropReason),
    Stored {
        event: MotionEvent,
        /// `None` when no alert was attempted
        alert: Option<AlertOutcome>,
    },
}

impl IngestOutcome {
    pub fn stored_event(&self) -> Option<&MotionEvent> {
        match self {
            IngestOutcome::Stored { event, .. } => Some(event),
            IngestOutcome::Dropped(_) => None,
        }
    }

    pub fn alert(&self) -> Option<&AlertOutcome> {
        match self {
            IngestOutcome::Stored { alert, .. } => alert.as_ref(),
            IngestOutcome::Dropped(_) => None,
        }
    }
}
