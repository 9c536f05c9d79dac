//! Mail adapters

pub mod http;

pub use http::{HttpMailer, NoopMailer};
