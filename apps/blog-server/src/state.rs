//! Application state - shared across all handlers.

use std::sync::Arc;

use tera::Tera;

use blog_core::ports::{CommentRepository, Mailer, PostRepository, TagRepository, UserRepository};
use blog_infra::{ConsoleMailer, InMemoryStore};

#[cfg(feature = "postgres")]
use blog_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use blog_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};
#[cfg(feature = "smtp")]
use blog_infra::SmtpMailer;

use crate::config::AppConfig;

/// Template directory of a source checkout, used when `TEMPLATE_DIR` is unset.
pub const DEFAULT_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub templates: Arc<Tera>,
    /// Sender of outgoing mail.
    pub from_email: String,
    /// Which storage backend is serving requests.
    pub storage: &'static str,
}

/// Compile every page template under `dir`.
pub fn load_templates(dir: &str) -> Result<Tera, tera::Error> {
    let dir = dir.trim_end_matches('/');
    let tera = Tera::new(&format!("{dir}/**/*.html"))?;

    let count = tera.get_template_names().count();
    if count == 0 {
        return Err(tera::Error::msg(format!("no templates found in {dir}")));
    }
    tracing::debug!(dir = %dir, count, "Templates loaded");
    Ok(tera)
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, tera::Error> {
        let templates = Arc::new(load_templates(&config.template_dir)?);
        let mailer = build_mailer(config);

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let db = connections.main;
                    tracing::info!("Application state initialized (postgres)");
                    return Ok(Self {
                        users: Arc::new(PostgresUserRepository::new(db.clone())),
                        posts: Arc::new(PostgresPostRepository::new(db.clone())),
                        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
                        tags: Arc::new(PostgresTagRepository::new(db)),
                        mailer,
                        templates,
                        from_email: config.from_email.clone(),
                        storage: "postgres",
                    });
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        tracing::info!("Application state initialized (memory)");
        Ok(Self::with_store(
            Arc::new(InMemoryStore::new()),
            mailer,
            templates,
            config.from_email.clone(),
        ))
    }

    /// State backed by a single in-memory store.
    pub fn with_store(
        store: Arc<InMemoryStore>,
        mailer: Arc<dyn Mailer>,
        templates: Arc<Tera>,
        from_email: String,
    ) -> Self {
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            tags: store,
            mailer,
            templates,
            from_email,
            storage: "memory",
        }
    }
}

fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    #[cfg(feature = "smtp")]
    if let Some(smtp) = &config.smtp {
        match SmtpMailer::new(smtp) {
            Ok(mailer) => return Arc::new(mailer),
            Err(e) => tracing::error!("Failed to configure SMTP: {}. Using console mail.", e),
        }
    }

    if config.smtp.is_none() {
        tracing::warn!("EMAIL_HOST not set. Outgoing mail is written to the log.");
    }
    Arc::new(ConsoleMailer::new())
}
