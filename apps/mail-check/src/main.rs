//! Verify the mail settings by sending a single test message.

use anyhow::{Context, Result, bail};
use clap::Parser;

use blog_core::ports::{EmailMessage, Mailer};
use blog_infra::mail::{default_from_email, mask_email};
use blog_infra::{SmtpConfig, SmtpMailer};

#[derive(Parser)]
#[command(name = "mail-check")]
#[command(about = "Send a test email using the EMAIL_* settings")]
#[command(version)]
struct Args {
    /// Recipient of the test message
    #[arg(long)]
    to: String,

    /// Sender address; defaults to DEFAULT_FROM_EMAIL, then EMAIL_HOST_USER
    #[arg(long)]
    from: Option<String>,

    #[arg(long, default_value = "Test")]
    subject: String,

    #[arg(long, default_value = "Test email from the blog")]
    body: String,

    /// Only open a connection to the relay, do not send
    #[arg(long)]
    connect_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();

    let Some(config) = SmtpConfig::from_env() else {
        bail!("EMAIL_HOST is not set; nothing to check");
    };
    let mailer = SmtpMailer::new(&config).context("configuring the SMTP transport")?;

    if args.connect_only {
        if mailer.test_connection().await? {
            println!("Connected to {}:{}", config.host, config.port);
            return Ok(());
        }
        bail!("{}:{} did not accept the connection", config.host, config.port);
    }

    let message = EmailMessage {
        from: args.from.unwrap_or_else(default_from_email),
        to: args.to,
        subject: args.subject,
        body: args.body,
    };
    let recipient = mask_email(&message.to);

    match mailer.send(message).await {
        Ok(()) => {
            println!("Email sent successfully to {recipient}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to send email: {e}");
            Err(e.into())
        }
    }
}
