//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::entities::{
    Cart, CartId, CartItem, CartItemId, Company, CompanyId, CompanyUpdate, NewCartItem,
    NewCompany, NewOrder, NewProduct, NewQuote, NewSapConnection, NewUser, Order, OrderId,
    PortalUser, Product, ProductId, ProductUpdate, Quote, QuoteId, SapConnection, UserId,
};
use crate::error::DomainError;

/// Repository for Company entities
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Find a company by ID
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, DomainError>;

    /// Find a company by its SAP sold-to number
    async fn find_by_sold_to(&self, sold_to: &str) -> Result<Option<Company>, DomainError>;

    /// List all companies ordered by name
    async fn list(&self) -> Result<Vec<Company>, DomainError>;

    /// Create a new company
    async fn create(&self, company: &NewCompany) -> Result<Company, DomainError>;

    /// Apply a partial update
    async fn update(&self, id: &CompanyId, update: &CompanyUpdate)
        -> Result<Company, DomainError>;
}

/// Repository for stored SAP credentials
#[async_trait]
pub trait SapConnectionRepository: Send + Sync {
    /// Find the connection of a company
    async fn find_by_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Option<SapConnection>, DomainError>;

    /// Create or replace the connection of a company
    async fn upsert(
        &self,
        company_id: &CompanyId,
        connection: &NewSapConnection,
    ) -> Result<SapConnection, DomainError>;
}

/// Repository for portal users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by API key hash
    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<PortalUser>, DomainError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, DomainError>;

    /// List users, optionally limited to one company
    async fn list(&self, company_id: Option<&CompanyId>) -> Result<Vec<PortalUser>, DomainError>;

    /// Create a new user
    async fn create(&self, user: &NewUser) -> Result<PortalUser, DomainError>;

    /// Update the last seen timestamp
    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError>;
}

/// Repository for catalog products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by ID
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// Find a product by material number
    async fn find_by_material(&self, material: &str) -> Result<Option<Product>, DomainError>;

    /// Search active products by material or description
    async fn search(&self, query: Option<&str>, limit: u64) -> Result<Vec<Product>, DomainError>;

    /// Create a new product
    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError>;

    /// Apply a partial update
    async fn update(&self, id: &ProductId, update: &ProductUpdate)
        -> Result<Product, DomainError>;

    /// Delete a product, returns false if it did not exist
    async fn delete(&self, id: &ProductId) -> Result<bool, DomainError>;
}

/// Repository for carts and their lines
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find the open cart of a user (with items)
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, DomainError>;

    /// Create an empty cart for a user
    async fn create(
        &self,
        user_id: &UserId,
        company_id: Option<&CompanyId>,
    ) -> Result<Cart, DomainError>;

    /// Append a line at the given position
    async fn add_item(
        &self,
        cart_id: &CartId,
        item: &NewCartItem,
        position: i32,
    ) -> Result<CartItem, DomainError>;

    /// Change the quantity of a line, None if the line is not in the cart
    async fn update_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Decimal,
    ) -> Result<Option<CartItem>, DomainError>;

    /// Remove a line, returns false if it was not in the cart
    async fn remove_item(&self, cart_id: &CartId, item_id: &CartItemId)
        -> Result<bool, DomainError>;

    /// Remove all lines
    async fn clear(&self, cart_id: &CartId) -> Result<(), DomainError>;
}

/// Repository for orders placed through the portal
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Most recent orders of a company
    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        limit: u64,
    ) -> Result<Vec<Order>, DomainError>;
}

/// Repository for quotes requested through the portal
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: &NewQuote) -> Result<Quote, DomainError>;

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError>;

    /// Most recent quotes of a company
    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        limit: u64,
    ) -> Result<Vec<Quote>, DomainError>;
}
