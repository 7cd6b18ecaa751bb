//! HTTP middleware implementations

pub mod auth;
pub mod helpers;

pub use auth::AuthMiddleware;
