use crate::domain::Result;
use async_trait::async_trait;

/// A composed alert ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Outbound mail delivery
///
/// Implementations should:
/// - Authenticate against the relay over a secured session
/// - Deliver exactly one message to one recipient
/// - Return an error on any address, session or delivery failure
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: AlertEmail) -> Result<()>;
}
