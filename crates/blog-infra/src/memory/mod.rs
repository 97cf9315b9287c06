//! In-memory persistence - used as fallback when no database is configured.

mod search;
mod store;

pub use search::rank;
pub use store::InMemoryStore;
