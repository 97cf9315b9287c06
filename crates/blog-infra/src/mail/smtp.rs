//! SMTP transport built on lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use blog_core::error::MailError;
use blog_core::ports::{EmailMessage, Mailer};

use super::{SmtpConfig, mask_email};

/// Delivers mail through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        // Delivery waits on the relay for as long as it takes.
        builder = builder.port(config.port).timeout(None);

        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            tls = config.use_tls,
            "SMTP mailer configured"
        );

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Open a connection and check the relay accepts it.
    pub async fn test_connection(&self) -> Result<bool, MailError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| {
            MailError::Address(format!("{address}: {e}"))
        })
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let email = Message::builder()
            .from(mailbox(&message.from)?)
            .to(mailbox(&message.to)?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(email).await.map_err(|e| {
            tracing::error!(to = %mask_email(&message.to), error = %e, "SMTP delivery failed");
            MailError::Transport(e.to_string())
        })?;

        tracing::info!(to = %mask_email(&message.to), "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_has_no_command_timeout() {
        let config = SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            username: None,
            password: None,
            use_tls: false,
        };

        let mailer = SmtpMailer::new(&config).unwrap();
        let transport = format!("{:?}", mailer.transport);

        assert!(transport.contains("port: 2525"));
        assert!(transport.contains("timeout: None"));
    }
}
