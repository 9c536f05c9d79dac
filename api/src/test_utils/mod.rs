//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The mocks are hand-written rather than generated: the port traits take
//! borrowed `&str`/`&SapConnection` arguments, and the SAP mock needs to
//! record what it was sent so tests can assert on the outgoing payloads.
//!
//! Services take their ports as trait objects, so the same mocks back both the
//! service unit tests and the axum-test router tests in `integration_tests`.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
