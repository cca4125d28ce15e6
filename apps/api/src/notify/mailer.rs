//! Pluggable mail transport: lettre SMTP in production, a logging no-op when
//! email is not configured, and recording fakes in tests.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::info;

use crate::config::MailSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build failed: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("bad attachment content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    #[error("SMTP send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("send task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<EmailAttachment>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// False when sends are skipped entirely (unconfigured deployments).
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Real SMTP delivery. lettre's transport is blocking, so sends run on the
/// blocking pool.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    /// `secure` selects implicit TLS; otherwise the connection upgrades via
    /// STARTTLS, matching the usual port 465 / 587 split.
    pub fn new(settings: &MailSettings) -> Result<Self, MailError> {
        let credentials = Credentials::new(settings.user.clone(), settings.pass.clone());
        let builder = if settings.secure {
            SmtpTransport::relay(&settings.host)?
        } else {
            SmtpTransport::starttls_relay(&settings.host)?
        };
        let transport = builder.port(settings.port).credentials(credentials).build();
        let from = settings.from.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

fn build_message(from: &Mailbox, email: OutgoingEmail) -> Result<Message, MailError> {
    let OutgoingEmail {
        to,
        subject,
        html_body,
        attachment,
    } = email;

    let to: Mailbox = to.parse()?;
    let builder = Message::builder().from(from.clone()).to(to).subject(subject);

    let message = match attachment {
        Some(att) => {
            let content_type = ContentType::parse(&att.content_type)?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    )
                    .singlepart(Attachment::new(att.filename).body(att.bytes, content_type)),
            )?
        }
        None => builder.header(ContentType::TEXT_HTML).body(html_body)?,
    };
    Ok(message)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, email)?;
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        Ok(())
    }
}

/// Installed when email is disabled or not fully configured. Sends succeed,
/// so intake never depends on mail setup.
pub struct NoopMailer;

#[async_trait]
impl MailTransport for NoopMailer {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "email transport disabled, skipping send");
        Ok(())
    }
}
