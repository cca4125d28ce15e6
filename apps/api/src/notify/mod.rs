//! Background notification pipeline.
//!
//! The submit handler enqueues a job and returns; a single worker task
//! consumes the queue and sends the internal notification (with a PDF summary
//! attached when it renders) followed by the candidate confirmation. Every
//! failure is logged and contained here; nothing in this module can fail a
//! submission that already returned 200.

pub mod mailer;
pub mod summary;
pub mod templates;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::models::application::ApplicationRecord;
use mailer::{EmailAttachment, MailTransport, OutgoingEmail};

/// Addresses and links the worker needs to compose messages.
#[derive(Debug, Clone, Default)]
pub struct NotifySettings {
    pub admin_email: String,
    pub app_url: String,
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<ApplicationRecord>,
}

impl Notifier {
    /// Starts the worker task. The worker exits once every `Notifier` clone
    /// is dropped and the queue is drained, so tests can await the handle for
    /// a deterministic flush.
    pub fn spawn(
        transport: Arc<dyn MailTransport>,
        settings: NotifySettings,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ApplicationRecord>();
        let handle = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                notify_for(transport.as_ref(), &settings, &record).await;
            }
        });
        (Self { tx }, handle)
    }

    /// Never blocks and never errors the request path.
    pub fn enqueue(&self, record: ApplicationRecord) {
        if self.tx.send(record).is_err() {
            error!("notification worker is gone, dropping job");
        }
    }
}

async fn notify_for(
    transport: &dyn MailTransport,
    settings: &NotifySettings,
    record: &ApplicationRecord,
) {
    if !transport.is_enabled() {
        info!(application_id = %record.id, "email disabled, skipping notifications");
        return;
    }

    send_internal(transport, settings, record).await;
    send_confirmation(transport, record).await;
}

/// Internal notification to the review inbox. A failed send with an
/// attachment gets one retry without it, in case the attachment itself is
/// what the server rejected.
async fn send_internal(
    transport: &dyn MailTransport,
    settings: &NotifySettings,
    record: &ApplicationRecord,
) {
    let subject = format!("New Application: {}", record.applicant_name());
    let html = templates::internal_notification(record, &settings.app_url);

    let attachment = match summary::render_summary_pdf(record) {
        Ok(bytes) => Some(EmailAttachment {
            filename: format!("application-{}.pdf", record.id),
            content_type: "application/pdf".to_string(),
            bytes,
        }),
        Err(err) => {
            warn!(
                application_id = %record.id,
                error = %err,
                "summary PDF failed to render, sending without attachment"
            );
            None
        }
    };
    let had_attachment = attachment.is_some();

    let email = OutgoingEmail {
        to: settings.admin_email.clone(),
        subject: subject.clone(),
        html_body: html.clone(),
        attachment,
    };

    if let Err(err) = transport.send(email).await {
        error!(application_id = %record.id, error = %err, "internal notification failed");
        if had_attachment {
            let retry = OutgoingEmail {
                to: settings.admin_email.clone(),
                subject,
                html_body: html,
                attachment: None,
            };
            match transport.send(retry).await {
                Ok(()) => {
                    info!(application_id = %record.id, "internal notification delivered without attachment");
                }
                Err(err) => {
                    error!(application_id = %record.id, error = %err, "internal notification retry failed");
                }
            }
        }
    }
}

async fn send_confirmation(transport: &dyn MailTransport, record: &ApplicationRecord) {
    let Some(to) = record
        .personal_info
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
    else {
        info!(application_id = %record.id, "no applicant email on record, skipping confirmation");
        return;
    };

    let email = OutgoingEmail {
        to: to.to_string(),
        subject: "We received your application".to_string(),
        html_body: templates::candidate_confirmation(record),
        attachment: None,
    };
    if let Err(err) = transport.send(email).await {
        error!(application_id = %record.id, error = %err, "candidate confirmation failed");
    }
}
