use crate::domain::{AlertEmail, AlertError, MailTransport, Result};
use crate::smtp::SmtpConfig;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

/// Mail transport over an authenticated STARTTLS session
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
            .map_err(|e| AlertError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        debug!(
            server = %config.server,
            port = config.port,
            "configured SMTP transport"
        );

        Ok(Self { transport })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| AlertError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Convert an alert email into an HTML MIME message
pub fn build_message(email: &AlertEmail) -> Result<Message> {
    Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(email.html_body.clone())
        .map_err(|e| AlertError::Compose(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: AlertEmail) -> Result<()> {
        let message = build_message(&email)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| AlertError::Transport(e.to_string()))?;

        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
