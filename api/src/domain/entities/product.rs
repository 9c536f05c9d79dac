//! Product catalog entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl From<Uuid> for ProductId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sellable product, keyed by its SAP material number
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub material: String,
    pub description: String,
    /// Sales unit of measure (e.g. `EA`, `PC`)
    pub unit: String,
    pub list_price: Decimal,
    pub currency: String,
    /// Variant-configurable material (characteristics required at order time)
    pub configurable: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a product
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub material: String,
    pub description: String,
    pub unit: String,
    pub list_price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub configurable: bool,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), String> {
        if self.material.trim().is_empty() || self.material.len() > 40 {
            return Err("Material must be between 1 and 40 characters".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        if self.unit.trim().is_empty() || self.unit.len() > 3 {
            return Err("Unit must be between 1 and 3 characters".to_string());
        }
        if self.list_price.is_sign_negative() {
            return Err("List price cannot be negative".to_string());
        }
        if self.currency.len() != 3 {
            return Err("Currency must be an ISO 4217 code".to_string());
        }
        Ok(())
    }
}

/// Partial update of a product
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub description: Option<String>,
    pub unit: Option<String>,
    pub list_price: Option<Decimal>,
    pub currency: Option<String>,
    pub configurable: Option<bool>,
    pub active: Option<bool>,
}
