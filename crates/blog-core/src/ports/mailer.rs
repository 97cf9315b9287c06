//! Outbound mail port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// A plain-text message to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail transport - abstraction over SMTP, console and in-memory delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message. Failures are returned, never retried.
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}
