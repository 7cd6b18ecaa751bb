//! Request routing with credential failover
//!
//! ## Module Structure
//!
//! - `selection` - Ordered candidate list from the catalog snapshot
//! - `health` - Counters, demotion and recovery after each attempt
//! - `transport` - Upstream HTTP calls
//! - `execution` - The failover state machine and the credential probe
//! - `error` - Request-level routing errors

pub mod error;
pub mod execution;
pub mod health;
pub mod selection;
pub mod transport;

#[cfg(test)]
mod tests;

pub use error::{ALL_FAILED, ALL_RATE_LIMITED, AttemptError, ExhaustedError, RoutingError};
pub use execution::{
    CHAT_COMPLETIONS_PATH, DEFAULT_PROBE_MESSAGE, ExecutorSettings, FailoverExecutor, ProbeReport,
    ProbeStatus,
};
pub use health::{HealthPolicy, HealthTracker};
pub use selection::CandidateSelector;
pub use transport::{ReqwestTransport, UpstreamResponse, UpstreamTransport};
