//! Outbound mail: SMTP via lettre, a console transport for development and an
//! in-memory outbox for tests.

mod console;
mod memory;
#[cfg(feature = "smtp")]
mod smtp;

pub use console::ConsoleMailer;
pub use memory::InMemoryMailer;
#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;

/// Sender used when neither `DEFAULT_FROM_EMAIL` nor `EMAIL_HOST_USER` is set.
pub const FALLBACK_FROM_EMAIL: &str = "webmaster@localhost";

/// SMTP connection configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS.
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Read the `EMAIL_*` variables. `None` when `EMAIL_HOST` is unset, in
    /// which case messages go to the console transport.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("EMAIL_HOST").ok().filter(|h| !h.is_empty())?;

        Some(Self {
            host,
            port: std::env::var("EMAIL_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username: std::env::var("EMAIL_HOST_USER").ok().filter(|s| !s.is_empty()),
            password: std::env::var("EMAIL_HOST_PASSWORD").ok(),
            use_tls: std::env::var("EMAIL_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }
}

/// Resolve the sender address: `DEFAULT_FROM_EMAIL`, then `EMAIL_HOST_USER`,
/// then [`FALLBACK_FROM_EMAIL`].
pub fn default_from_email() -> String {
    ["DEFAULT_FROM_EMAIL", "EMAIL_HOST_USER"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_FROM_EMAIL.to_string())
}

/// Hide the local part of an address for logging: `jane@x.org` -> `j***@x.org`.
pub fn mask_email(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("jane@example.org"), "j***@example.org");
        assert_eq!(mask_email("@example.org"), "***@example.org");
        assert_eq!(mask_email("nobody"), "***");
    }
}
