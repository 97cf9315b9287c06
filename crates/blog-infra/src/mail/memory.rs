//! In-memory mail outbox.

use async_trait::async_trait;
use tokio::sync::RwLock;

use blog_core::error::MailError;
use blog_core::ports::{EmailMessage, Mailer};

/// Collects sent messages in memory. Can be told to fail every send.
#[derive(Default)]
pub struct InMemoryMailer {
    outbox: RwLock<Vec<EmailMessage>>,
    failure: Option<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with a transport error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outbox: RwLock::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    /// Messages delivered so far, oldest first.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if let Some(reason) = &self.failure {
            return Err(MailError::Transport(reason.clone()));
        }

        self.outbox.write().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "blog@example.com".into(),
            to: "friend@example.com".into(),
            subject: "Hi".into(),
            body: "Read this".into(),
        }
    }

    #[tokio::test]
    async fn records_sent_messages() {
        let mailer = InMemoryMailer::new();
        mailer.send(message()).await.unwrap();
        mailer.send(message()).await.unwrap();

        assert_eq!(mailer.sent().await, vec![message(), message()]);
    }

    #[tokio::test]
    async fn failing_mailer_keeps_outbox_empty() {
        let mailer = InMemoryMailer::failing("connection refused");

        let result = mailer.send(message()).await;

        assert!(matches!(result, Err(MailError::Transport(reason)) if reason == "connection refused"));
        assert!(mailer.sent().await.is_empty());
    }
}
