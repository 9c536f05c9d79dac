//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod cart_service;
pub mod catalog_service;
pub mod company_service;
pub mod document_service;
pub mod order_service;
pub mod partner_service;
pub mod user_service;

pub use cart_service::CartService;
pub use catalog_service::{CatalogService, Recommendation};
pub use company_service::{CompanyService, ConnectionTest};
pub use document_service::{DocumentList, DocumentService};
pub use order_service::{
    CheckoutOutcome, CheckoutRequest, OrderService, QuoteOutcome, QuoteRequest, SimulateRequest,
};
pub use partner_service::PartnerService;
pub use user_service::{CreateUserRequest, UserService};
