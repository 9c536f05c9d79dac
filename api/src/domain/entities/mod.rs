//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod cart;
pub mod company;
pub mod product;
pub mod sales_document;
pub mod sap;
pub mod user;

pub use cart::{validate_quantity, Cart, CartId, CartItem, CartItemId, Characteristic, NewCartItem};
pub use company::{Company, CompanyId, CompanyUpdate, NewCompany, SalesArea};
pub use product::{NewProduct, Product, ProductId, ProductUpdate};
pub use sales_document::{
    DocumentLine, DocumentStatus, NewOrder, NewQuote, Order, OrderId, Quote, QuoteId,
};
pub use sap::{
    Address, Delivery, DeliveryItem, DocumentSource, Invoice, MessageSeverity, NewSapConnection,
    OrderChannel, Partner, RequestItem, SalesDocumentRequest, SalesDocumentSummary,
    SapConnection, SapMessage, SapResult, SimulatedItem, Simulation,
};
pub use user::{NewUser, PortalUser, Role, UserId};
