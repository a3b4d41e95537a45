use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use super::MailSender;
use super::types::OutgoingDigest;
use crate::config::{ENV_PASSWORD, ENV_SENDER, SmtpConfig};
use crate::error::DigestError;

/// STARTTLS submission client. A fresh session is opened per message.
pub struct SmtpClient {
    server: String,
    port: u16,
    sender: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl SmtpClient {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            sender: config.sender.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn sender(&self) -> Result<&str> {
        Ok(self
            .sender
            .as_deref()
            .ok_or(DigestError::ConfigurationMissing(ENV_SENDER))?)
    }

    /// Build the `multipart/alternative` message: plain-text fallback plus HTML
    pub fn build_message(&self, digest: &OutgoingDigest) -> Result<Message> {
        let from_mailbox = self
            .sender()?
            .parse::<Mailbox>()
            .context("Invalid from address")?;
        let to_mailbox = digest
            .to
            .trim()
            .parse::<Mailbox>()
            .context(format!("Invalid recipient address: {}", digest.to))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&digest.subject)
            .multipart(MultiPart::alternative_plain_html(
                digest.plain_text(),
                digest.html.clone(),
            ))
            .context("Failed to build email message")
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let username = self.sender()?;
        let password = self
            .password
            .as_deref()
            .ok_or(DigestError::ConfigurationMissing(ENV_PASSWORD))?;
        let creds = Credentials::new(username.to_string(), password.to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.server)
            .context("Failed to create SMTP transport")?
            .port(self.port)
            .credentials(creds)
            .authentication(vec![Mechanism::Plain, Mechanism::Login])
            .timeout(Some(self.timeout))
            .build();

        Ok(transport)
    }

    pub async fn send(&self, digest: &OutgoingDigest) -> Result<()> {
        let message = self.build_message(digest)?;
        let transport = self.transport()?;

        transport
            .send(message)
            .await
            .context("Failed to send email")?;

        tracing::info!("Digest email sent to {}", digest.to);
        Ok(())
    }
}

impl MailSender for SmtpClient {
    async fn send(&self, digest: &OutgoingDigest) -> Result<()> {
        SmtpClient::send(self, digest).await
    }
}
