//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod documents;
pub mod partners;
pub mod records;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::CompanyId;

pub use account::me;
pub use admin::{
    create_company, create_product, create_user, delete_product, list_companies, list_users,
    put_connection, test_connection, update_company, update_product,
};
pub use cart::{
    add_item, checkout, clear_cart, get_cart, remove_item, request_quote, simulate, update_item,
};
pub use catalog::{get_product, list_products, recommend};
pub use documents::{deliveries, invoices, quotations, sales_orders};
pub use partners::{get_partner, ship_to_parties};
pub use records::{get_order, get_quote, list_orders, list_quotes};

/// Company selection for staff users, plus an optional result size
#[derive(Debug, Default, Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub top: Option<u32>,
}

impl CompanyQuery {
    pub fn company(&self) -> Option<CompanyId> {
        self.company_id.map(CompanyId)
    }
}
