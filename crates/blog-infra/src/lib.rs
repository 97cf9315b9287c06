//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//! This crate contains the database, in-memory and mail integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `smtp` - SMTP mail delivery via lettre

#[cfg(feature = "postgres")]
pub mod database;
pub mod mail;
pub mod memory;

// Re-exports - In-Memory
pub use mail::{ConsoleMailer, InMemoryMailer, SmtpConfig};
pub use memory::InMemoryStore;

// Re-exports - External services
#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections};
#[cfg(feature = "smtp")]
pub use mail::SmtpMailer;
