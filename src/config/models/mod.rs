//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod auth;
pub mod gateway;
pub mod provider;
pub mod router;
pub mod server;
pub mod storage;

// Re-export all configuration types
pub use auth::*;
pub use gateway::*;
pub use provider::*;
pub use router::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default upstream request timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_database_url() -> String {
    "sqlite://data/keyrelay.db?mode=rwc".to_string()
}

pub fn default_cors_max_age() -> u32 {
    3600
}

pub fn default_health_step() -> i64 {
    1
}

pub fn default_severe_health_step() -> i64 {
    10
}

pub fn default_true() -> bool {
    true
}
