//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod cart_repo;
pub mod company_repo;
pub mod order_repo;
pub mod product_repo;
pub mod sap_connection_repo;
pub mod user_repo;


use sea_orm::{DbErr, SqlErr};

use crate::error::DomainError;

pub use cart_repo::PostgresCartRepository;
pub use company_repo::PostgresCompanyRepository;
pub use order_repo::{PostgresOrderRepository, PostgresQuoteRepository};
pub use product_repo::PostgresProductRepository;
pub use sap_connection_repo::PostgresSapConnectionRepository;
pub use user_repo::PostgresUserRepository;

/// Map a unique constraint violation to `AlreadyExists`, anything else to `Database`
pub(crate) fn unique_violation(e: DbErr, what: String) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::AlreadyExists(what),
        _ => DomainError::Database(e.to_string()),
    }
}
