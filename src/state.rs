//! Application state for Bookshelf.
//!
//! Contains the shared state that is passed to all handlers.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::db::DbPool;
use crate::services::AuthorService;
use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Source of entity timestamps.
    pub clock: Arc<dyn Clock>,
    /// Author resource controller.
    pub authors: AuthorService,
}

impl AppState {
    /// Create a new application state from the global configuration.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        // Initialize database
        let db = crate::db::init_pool(&config.database.path).await?;

        // Initialize database schema
        crate::db::initialize_schema(&db).await?;

        Self::from_parts(db, Arc::new(SystemClock), &config.server.public_url)
    }

    /// Assemble state around an existing pool and clock.
    pub fn from_parts(db: DbPool, clock: Arc<dyn Clock>, public_url: &str) -> Result<Self> {
        let authors = AuthorService::new(db.clone(), clock.clone(), public_url)?;

        Ok(Self { db, clock, authors })
    }
}
