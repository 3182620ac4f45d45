use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::domain::credential::errors::NotifierError;
use crate::domain::credential::models::EmailAddress;
use crate::domain::credential::ports::Notifier;

/// SMTP-backed notifier for reset-token delivery.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    /// Build a STARTTLS transport against `host:port` with the given
    /// credentials. `from` is the sender mailbox, e.g. `Accounts <no-reply@example.com>`.
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: String,
    ) -> Result<Self, NotifierError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NotifierError::SendFailed(e.to_string()))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifierError> {
        let from = self
            .from
            .parse()
            .map_err(|_| NotifierError::InvalidRecipient(self.from.clone()))?;
        let to = recipient
            .as_str()
            .parse()
            .map_err(|_| NotifierError::InvalidRecipient(recipient.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifierError::SendFailed(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifierError::SendFailed(e.to_string()))?;

        tracing::debug!(recipient = %recipient, "notification sent");

        Ok(())
    }
}
