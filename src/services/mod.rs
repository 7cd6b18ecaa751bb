//! Services module
//!
//! Cross-cutting services shared by the router and the server

pub mod events;

pub use events::{EventBus, EventSink, GatewayEvent, NoopEventSink};
