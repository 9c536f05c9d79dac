//! Shopping cart entity
//!
//! Each user has at most one open cart. Item order is significant: it decides
//! the positional item numbers of the SAP document built from the cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CompanyId, UserId};

/// Unique identifier for a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartId(pub Uuid);

impl From<Uuid> for CartId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemId(pub Uuid);

impl From<Uuid> for CartItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CartItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variant configuration value (characteristic name / value pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub name: String,
    pub value: String,
}

/// A line in the cart
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub material: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub plant: Option<String>,
    pub configuration: Vec<Characteristic>,
    /// Sort key inside the cart
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn is_configured(&self) -> bool {
        !self.configuration.is_empty()
    }
}

/// A user's open cart
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub company_id: Option<CompanyId>,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items sorted by their position in the cart
    pub fn ordered_items(&self) -> Vec<&CartItem> {
        let mut items: Vec<&CartItem> = self.items.iter().collect();
        items.sort_by_key(|i| (i.position, i.created_at));
        items
    }

    /// Next free position for a new line
    pub fn next_position(&self) -> i32 {
        self.items.iter().map(|i| i.position).max().unwrap_or(0) + 1
    }
}

/// Data for a new cart line
#[derive(Debug, Clone, Deserialize)]
pub struct NewCartItem {
    pub material: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub plant: Option<String>,
    #[serde(default)]
    pub configuration: Vec<Characteristic>,
}

impl NewCartItem {
    pub fn validate(&self) -> Result<(), String> {
        if self.material.trim().is_empty() {
            return Err("Material is required".to_string());
        }
        validate_quantity(self.quantity)?;
        if self
            .configuration
            .iter()
            .any(|c| c.name.trim().is_empty() || c.value.trim().is_empty())
        {
            return Err("Characteristic names and values must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn validate_quantity(quantity: Decimal) -> Result<(), String> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero".to_string());
    }
    if quantity.scale() > 3 {
        return Err("Quantity supports at most three decimals".to_string());
    }
    Ok(())
}
