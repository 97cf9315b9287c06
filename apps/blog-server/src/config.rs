//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "postgres")]
use blog_infra::DatabaseConfig;
use blog_infra::SmtpConfig;
use blog_infra::mail::default_from_email;

use crate::state::DEFAULT_TEMPLATE_DIR;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// `None` sends mail to the console.
    pub smtp: Option<SmtpConfig>,
    /// Sender of outgoing mail.
    pub from_email: String,
    /// Root of the page templates.
    pub template_dir: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            smtp: SmtpConfig::from_env(),
            from_email: default_from_email(),
            template_dir: env::var("TEMPLATE_DIR")
                .unwrap_or_else(|_| DEFAULT_TEMPLATE_DIR.to_string()),
        }
    }
}
