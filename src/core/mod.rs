//! Core functionality for the Gateway
//!
//! Domain models, canonical chat types, vendor adapters and the failover
//! router.

pub mod models;
pub mod providers;
pub mod router;
pub mod types;
