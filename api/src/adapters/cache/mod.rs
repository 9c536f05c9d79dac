//! Session cache adapters
//!
//! `RestSessionCache` talks to a command-style key-value HTTP API. Without a
//! configured URL the `NoopSessionCache` is used and every lookup misses.

pub mod rest;

pub use rest::{NoopSessionCache, RestSessionCache};
