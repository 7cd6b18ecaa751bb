//! Routing domain models
//!
//! Providers and their credentials as seen by the routing engine, the rotation
//! settings singleton, and the usage log record written for every attempt.

pub mod catalog;
pub mod rotation;
pub mod usage;

pub use catalog::{Candidate, CatalogSnapshot, Credential, Provider, VendorKind};
pub use rotation::{RotationSettings, RotationStrategy};
pub use usage::{AttemptStatus, UsageLogEntry};
