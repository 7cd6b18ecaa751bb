//! Common test utilities for keyrelay

pub mod database;
pub mod fixtures;
pub mod upstream;

pub use database::TestDatabase;
pub use fixtures::{CatalogBuilder, credential, provider};
