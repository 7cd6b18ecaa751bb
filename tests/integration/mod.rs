//! Integration tests

mod database_tests;
mod failover_tests;
mod server_tests;
