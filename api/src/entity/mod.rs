//! SeaORM entity models
//!
//! One module per table. Conversions into domain entities live next to the
//! repositories in `adapters::postgres`.

pub mod cart_items;
pub mod carts;
pub mod companies;
pub mod orders;
pub mod portal_users;
pub mod products;
pub mod quotes;
pub mod sap_connections;
