// Module declarations
mod catalog_ops;
mod connection;
mod health_ops;
mod types;
mod usage_ops;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
