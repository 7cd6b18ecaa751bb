//! Test database utilities
//!
//! Each test gets an isolated, migrated in-memory SQLite database.

use keyrelay::config::DatabaseConfig;
use keyrelay::storage::SeaOrmDatabase;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<SeaOrmDatabase>,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let db = SeaOrmDatabase::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");

        db.migrate()
            .await
            .expect("Failed to run database migrations");

        Self {
            inner: Arc::new(db),
        }
    }

    pub fn db(&self) -> &SeaOrmDatabase {
        &self.inner
    }

    pub fn db_arc(&self) -> Arc<SeaOrmDatabase> {
        Arc::clone(&self.inner)
    }
}

/// In-memory SQLite only works with a single connection
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
        enabled: true,
    }
}
