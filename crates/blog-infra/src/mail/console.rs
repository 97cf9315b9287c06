use async_trait::async_trait;

use blog_core::error::MailError;
use blog_core::ports::{EmailMessage, Mailer};

use super::mask_email;

/// Writes messages to the log instead of delivering them.
///
/// Used when no SMTP host is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            from = %mask_email(&message.from),
            to = %mask_email(&message.to),
            subject = %message.subject,
            body = %message.body,
            "Email (console transport)"
        );
        Ok(())
    }
}
