//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod cache;
pub mod completion;
pub mod mail;
pub mod postgres;
pub mod sap;

pub use cache::{NoopSessionCache, RestSessionCache};
pub use completion::{NoopCompletionClient, OpenAiCompletionClient};
pub use mail::{HttpMailer, NoopMailer};
pub use postgres::{
    PostgresCartRepository, PostgresCompanyRepository, PostgresOrderRepository,
    PostgresProductRepository, PostgresQuoteRepository, PostgresSapConnectionRepository,
    PostgresUserRepository,
};
pub use sap::SapGatewayImpl;
