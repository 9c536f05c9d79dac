//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{
    Company, CompanyId, OrderChannel, PortalUser, Product, ProductId, Role, SalesArea,
    SapConnection, UserId,
};

/// Create a test company in sales area 1000/10/00 without a default ship-to
pub fn test_company() -> Company {
    Company {
        id: CompanyId::new(),
        name: "Acme Industrial".to_string(),
        sold_to: "100001".to_string(),
        sales_area: SalesArea {
            sales_org: "1000".to_string(),
            distribution_channel: "10".to_string(),
            division: "00".to_string(),
        },
        default_ship_to: None,
        order_type: "OR".to_string(),
        quote_type: "AG".to_string(),
        active: true,
        created_at: Utc::now(),
    }
}

/// Create a test user with the given role
pub fn test_user(role: Role, company_id: Option<CompanyId>) -> PortalUser {
    let id = UserId::new();
    PortalUser {
        id,
        email: format!("user-{}@example.com", &id.0.simple().to_string()[..8]),
        display_name: "Test User".to_string(),
        role,
        company_id,
        api_key_hash: format!("hash-{}", id),
        created_at: Utc::now(),
        last_seen_at: None,
    }
}

/// Create a test SAP connection for a company
pub fn test_connection(company_id: CompanyId, order_channel: OrderChannel) -> SapConnection {
    SapConnection {
        company_id,
        base_url: "https://sap.example.com".to_string(),
        client: Some("100".to_string()),
        username: "PORTAL".to_string(),
        password: "secret".to_string(),
        order_channel,
        updated_at: Utc::now(),
    }
}

/// Create an active, non-configurable test product priced at 10 EUR
pub fn test_product(material: &str) -> Product {
    Product {
        id: ProductId(Uuid::new_v4()),
        material: material.to_string(),
        description: format!("Test product {}", material),
        unit: "EA".to_string(),
        list_price: Decimal::new(10, 0),
        currency: "EUR".to_string(),
        configurable: false,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
