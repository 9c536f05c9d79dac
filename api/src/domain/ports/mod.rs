//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod cache;
pub mod completion;
pub mod mail;
pub mod repositories;
pub mod sap;

pub use cache::SessionCache;
pub use completion::CompletionClient;
pub use mail::{EmailMessage, Mailer};
pub use repositories::{
    CartRepository, CompanyRepository, OrderRepository, ProductRepository, QuoteRepository,
    SapConnectionRepository, UserRepository,
};
pub use sap::SapGateway;
