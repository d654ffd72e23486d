//! Email construction and SMTP delivery.

use async_trait::async_trait;
use kpi_core::AppConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::MailError;

const SUBJECT_PREFIX: &str = "【HC】Daily KPI Report";

/// Sender and ordered recipients of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEnvelope {
    pub from: String,
    pub to: Vec<String>,
}

impl MailEnvelope {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            from: config.sender_address.clone(),
            to: config.recipients().into_iter().map(str::to_owned).collect(),
        }
    }
}

/// `【HC】Daily KPI Report: 2026-10-15(Thu)`
#[must_use]
pub fn subject_for(end_label: &str) -> String {
    format!("{SUBJECT_PREFIX}: {end_label}")
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Builds the `text/html` report message.
///
/// # Errors
///
/// [`MailError::InvalidAddress`] if any address does not parse,
/// [`MailError::Build`] if the message cannot be assembled.
pub fn build_message(
    envelope: &MailEnvelope,
    subject: &str,
    html: String,
) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&envelope.from)?)
        .subject(subject)
        .header(ContentType::TEXT_HTML);
    for recipient in &envelope.to {
        builder = builder.to(mailbox(recipient)?);
    }
    Ok(builder.body(html)?)
}

/// Delivers a finished message. One call per run; implementations do not retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), MailError>;
}

/// STARTTLS submission to an authenticated relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// Returns [`MailError::Relay`] if the TLS parameters for `host` cannot be built.
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| MailError::Relay {
                host: host.to_string(),
                reason: e.to_string(),
            })?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { transport })
    }

    /// Relay from `HC_SMTP_HOST`/`HC_SMTP_PORT`, logging in as the sender.
    ///
    /// # Errors
    ///
    /// See [`SmtpMailer::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, MailError> {
        Self::new(
            &config.smtp_host,
            config.smtp_port,
            &config.sender_address,
            &config.email_password,
        )
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        tracing::debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
